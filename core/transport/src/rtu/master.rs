use super::port;
use crate::settings::PortSettings;
use codec::Transport;
use log::{error, warn};
use std::io::{Error, ErrorKind, Read, Write};
use std::time::Duration;
use tokio_serial::{ClearBuffer, SerialPort};

/// Blocking serial transport for [`codec::Master`].
pub struct SerialMaster {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialMaster {
    /// Open the port, a reply that does not arrive within `timeout` counts as lost.
    pub fn open(settings: &PortSettings, timeout: Duration) -> Result<SerialMaster, Error> {
        let port = port::build_blocking(settings, timeout)?;
        Ok(SerialMaster {
            port,
            name: settings.name.clone(),
        })
    }
}

impl Transport for SerialMaster {
    fn transmit(&mut self, frame: &[u8]) {
        if let Err(err) = self.port.clear(ClearBuffer::Input) {
            warn!("{}: can't clear input: {}", self.name, err);
        }

        if let Err(err) = self.port.write_all(frame).and_then(|_| self.port.flush()) {
            error!("{}: write error: {}", self.name, err);
        }
    }

    fn request_reply(&mut self, buffer: &mut [u8]) -> usize {
        let mut received = 0;
        while received < buffer.len() {
            match self.port.read(&mut buffer[received..]) {
                Ok(0) => break,
                Ok(n) => received += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::TimedOut => break,
                Err(err) => {
                    error!("{}: read error: {}", self.name, err);
                    break;
                }
            }
        }
        received
    }
}
