use codec::{Addressing, SlaveContext};
use env_logger::Builder;
use log::{info, LevelFilter};
use tokio::signal;
use transport::rtu::RtuSlave;
use transport::Settings;

use std::env;
use std::str::FromStr;

fn read_discrete_input(address: u16) -> bool {
    address % 2 == 1
}

fn read_coil(address: u16) -> bool {
    address % 2 == 0
}

fn read_holding_register(address: u16) -> u16 {
    address
}

fn read_input_register(address: u16) -> u16 {
    address.wrapping_add(1)
}

fn write_coil(address: u16, value: u16) {
    info!("write coil {}={:#06X}", address, value);
}

fn write_holding_register(address: u16, value: u16) {
    info!("write holding register {}={}", address, value);
}

fn configure(context: SlaveContext<'static>) -> SlaveContext<'static> {
    context
        .on_read_discrete_input(read_discrete_input)
        .on_read_coil(read_coil)
        .on_write_coil(write_coil)
        .on_read_holding_register(read_holding_register)
        .on_write_holding_register(write_holding_register)
        .on_read_input_register(read_input_register)
}

fn usage() {
    println!(
        r#"slave-demo <port> [--strict]

Parameters:
    port - serial port and line settings, <name>:<speed>-<data bits>-<parity>-<stop bits>
    --strict - answer 0x0F/0x10 only on own address, accept broadcast silently

Env. variables:
    RUST_LOG - changes output verbosity. Values [error,warn,info,debug,trace]. info by default

Examples:
    slave-demo /dev/ttyUSB0:115200-8-N-1 - run slave #1 on /dev/ttyUSB0

    RUST_LOG=trace slave-demo /dev/ttyUSB0:9600-8-E-1 - run app with frame dumps
    "#
    );
}

fn read_args() -> Option<Settings> {
    let args: Vec<String> = env::args().skip(1).collect();
    let port = args.first()?;
    if port == "--help" || port == "-h" {
        return None;
    }

    let mut settings = Settings::from_str(port)
        .map_err(|err| eprintln!("{}", err))
        .ok()?;
    if args.iter().any(|arg| arg == "--strict") {
        settings.addressing = Addressing::Strict;
    }
    Some(settings)
}

fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match read_args() {
        Some(settings) => settings,
        None => {
            usage();
            return Ok(());
        }
    };

    init_logger();
    let slave = RtuSlave::build(&settings, configure)?;

    info!("press ctrl+c to exit");
    tokio::select! {
        res = slave.run() => res?,
        _ = signal::ctrl_c() => info!("stopping..."),
    }
    Ok(())
}
