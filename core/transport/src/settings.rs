use codec::Addressing;
use std::str::FromStr;
use std::time::Duration;
use tokio_serial::{DataBits, Parity, StopBits};

pub const DEFAULT_SLAVE: u8 = 1;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Serial line parameters written as `<name>:<speed>-<data bits>-<parity>-<stop bits>`,
/// e.g. `/dev/ttyUSB0:115200-8-N-1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PortSettings {
    pub name: String,
    pub speed: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl FromStr for PortSettings {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name: String = s.chars().take_while(|c| *c != ':').collect();
        let params: String = s.chars().skip_while(|c| *c != ':').skip(1).collect();
        let info: Vec<&str> = params.split('-').collect();

        if name.len() < 4 {
            return Err("name is too short");
        }

        if info.len() < 4 {
            return Err("not enough port parameters");
        }

        let speed = u32::from_str(info[0]).map_err(|_| "invalid speed")?;
        let data_bits = match info[1] {
            "5" => Ok(DataBits::Five),
            "6" => Ok(DataBits::Six),
            "7" => Ok(DataBits::Seven),
            "8" => Ok(DataBits::Eight),
            _ => Err("invalid data bits"),
        }?;

        let parity = match info[2] {
            "N" => Ok(Parity::None),
            "E" => Ok(Parity::Even),
            "O" => Ok(Parity::Odd),
            _ => Err("invalid parity"),
        }?;

        let stop_bits = match info[3] {
            "1" => Ok(StopBits::One),
            "2" => Ok(StopBits::Two),
            _ => Err("invalid stop bits"),
        }?;

        Ok(PortSettings {
            name,
            speed,
            data_bits,
            parity,
            stop_bits,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: PortSettings,
    /// Own address of a slave, target address of a master.
    pub slave: u8,
    /// Slave: drop a partial frame after this much silence.
    /// Master: how long to wait for a reply.
    pub timeout: Duration,
    pub addressing: Addressing,
}

impl Settings {
    pub fn new(port: PortSettings) -> Settings {
        Settings {
            port,
            slave: DEFAULT_SLAVE,
            timeout: DEFAULT_TIMEOUT,
            addressing: Addressing::default(),
        }
    }
}

impl FromStr for Settings {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortSettings::from_str(s).map(Settings::new)
    }
}
