use codec::Master;
use env_logger::Builder;
use frame::MAX_ADU_SIZE;
use log::{error, info, LevelFilter};
use transport::rtu::SerialMaster;
use transport::Settings;

use std::env;
use std::str::FromStr;

fn usage() {
    println!(
        r#"master-demo <port>

Parameters:
    port - serial port and line settings, <name>:<speed>-<data bits>-<parity>-<stop bits>

Env. variables:
    RUST_LOG - changes output verbosity. Values [error,warn,info,debug,trace]. info by default

Examples:
    master-demo /dev/ttyUSB1:115200-8-N-1 - poll slave #1 on /dev/ttyUSB1
    "#
    );
}

fn read_args() -> Option<Settings> {
    let arg: String = env::args().skip(1).take(1).collect();
    if arg.is_empty() || arg == "--help" || arg == "-h" {
        return None;
    }

    Settings::from_str(&arg)
        .map_err(|err| eprintln!("{}", err))
        .ok()
}

fn init_logger() {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    builder.init();
}

fn report<T: std::fmt::Debug>(name: &str, result: Result<(), frame::Error>, data: &[T]) {
    match result {
        Ok(()) => info!("{}: {:?}", name, data),
        Err(err) => error!("{}: {}", name, err),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match read_args() {
        Some(settings) => settings,
        None => {
            usage();
            return Ok(());
        }
    };

    init_logger();
    let transport = SerialMaster::open(&settings.port, settings.timeout)?;
    let mut master = Master::new(settings.slave, transport);
    let mut buffer = [0u8; MAX_ADU_SIZE];

    let mut bits = [false; 20];
    let res = master.read_discrete_inputs(0, &mut bits, &mut buffer);
    report("read discrete inputs", res, &bits);

    let mut bits = [false; 20];
    let res = master.read_coils(0, &mut bits, &mut buffer);
    report("read coils", res, &bits);

    let mut regs = [0u16; 20];
    let res = master.read_holding_registers(0, &mut regs, &mut buffer);
    report("read holding registers", res, &regs);

    let mut regs = [0u16; 20];
    let res = master.read_input_registers(0, &mut regs, &mut buffer);
    report("read input registers", res, &regs);

    let regs = [1u16, 4, 3, 2, 5];
    let res = master.write_holding_registers(0, &regs, &mut buffer);
    report("write holding registers", res, &regs);

    let bits = [true, false, false, true, true];
    let res = master.write_coils(0, &bits, &mut buffer);
    report("write coils", res, &bits);

    Ok(())
}
