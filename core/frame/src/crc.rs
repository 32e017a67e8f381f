//! CRC16 used by Modbus RTU (reflected, poly 0xA001, init 0xFFFF).

const INIT: u16 = 0xFFFF;
const POLY: u16 = 0xA001;

/// Calculate the checksum of `bytes`.
///
/// The value goes to the wire low byte first.
pub fn crc16(bytes: &[u8]) -> u16 {
    update(INIT, bytes)
}

/// Continue a running checksum with more bytes.
pub fn update(crc: u16, bytes: &[u8]) -> u16 {
    bytes.iter().fold(crc, |mut crc, byte| {
        crc ^= *byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
        crc
    })
}
