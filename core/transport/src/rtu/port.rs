use crate::settings::PortSettings;
use std::io::Error;
use std::time::Duration;
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilder, SerialPortBuilderExt, SerialStream};

fn builder(settings: &PortSettings) -> SerialPortBuilder {
    tokio_serial::new(settings.name.as_str(), settings.speed)
        .data_bits(settings.data_bits)
        .parity(settings.parity)
        .stop_bits(settings.stop_bits)
}

/// Open the port for use inside the tokio runtime.
pub fn build(settings: &PortSettings) -> Result<SerialStream, Error> {
    let port = builder(settings).open_native_async()?;
    port.clear(ClearBuffer::All)?;
    Ok(port)
}

/// Open the port for blocking use, reads give up after `timeout`.
pub fn build_blocking(
    settings: &PortSettings,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, Error> {
    let port = builder(settings).timeout(timeout).open()?;
    port.clear(ClearBuffer::All)?;
    Ok(port)
}
