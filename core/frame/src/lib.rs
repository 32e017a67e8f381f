pub mod common;
pub mod crc;
pub mod envelope;
pub mod error;

pub use crc::crc16;
pub use envelope::{append_crc, check_crc};
pub use error::Error;

pub const MAX_ADU_SIZE: usize = 256; // address + PDU + CRC
pub const MAX_PDU_SIZE: usize = 253; // Max. size of  protocol data unit
pub const CRC_SIZE: usize = 2;

pub const BROADCAST_ADDRESS: u8 = 0;

pub const MAX_READ_COILS: usize = 2000;
pub const MAX_WRITE_COILS: usize = 1968;
pub const MAX_READ_REGISTERS: usize = 125;
pub const MAX_WRITE_REGISTERS: usize = 123;

pub const COIL_ON: u16 = 0xFF00;
pub const COIL_OFF: u16 = 0x0000;

pub const READ_COILS: u8 = 0x01;
pub const READ_DISCRETE_INPUTS: u8 = 0x02;
pub const READ_HOLDING_REGISTERS: u8 = 0x03;
pub const READ_INPUT_REGISTERS: u8 = 0x04;
pub const WRITE_SINGLE_COIL: u8 = 0x05;
pub const WRITE_SINGLE_REGISTER: u8 = 0x06;
pub const WRITE_MULTIPLE_COILS: u8 = 0x0F;
pub const WRITE_MULTIPLE_REGISTERS: u8 = 0x10;
