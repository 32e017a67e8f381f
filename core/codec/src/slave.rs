//! Slave side: validate an inbound frame, call the data hooks, send the reply.
//!
//! The frame is processed inside a single caller-owned buffer. Fields are
//! always read before the reply overwrites them, so a request can be turned
//! into its reply in place.
use crate::helpers;
use frame::common;
use frame::*;
use log::debug;

pub type Output<'a> = Box<dyn FnMut(&[u8]) + 'a>;
pub type ReadBit<'a> = Box<dyn FnMut(u16) -> bool + 'a>;
pub type ReadRegister<'a> = Box<dyn FnMut(u16) -> u16 + 'a>;
pub type Write<'a> = Box<dyn FnMut(u16, u16) + 'a>;

// address, function, start, count
const REQUEST_HEADER_LEN: usize = 6;
// header + byte count
const WRITE_MULTIPLE_HEADER_LEN: usize = 7;
// echo of the multi-write header with CRC
const WRITE_MULTIPLE_REPLY_LEN: usize = 8;
// keeps count * 2 inside the one-byte count field
const MAX_REPLY_REGISTERS: usize = 127;

// Destination addresses accepted by 0x0F/0x10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Addressing {
    // any address but broadcast, answered with our own address
    #[default]
    Legacy,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Replied(usize),
    Ignored,
}

pub struct SlaveContext<'a> {
    address: u8,
    addressing: Addressing,
    output: Output<'a>,
    read_discrete_input: Option<ReadBit<'a>>,
    read_coil: Option<ReadBit<'a>>,
    write_coil: Option<Write<'a>>,
    read_holding_register: Option<ReadRegister<'a>>,
    write_holding_register: Option<Write<'a>>,
    read_input_register: Option<ReadRegister<'a>>,
}

impl<'a> SlaveContext<'a> {
    pub fn new<F>(address: u8, output: F) -> SlaveContext<'a>
    where
        F: FnMut(&[u8]) + 'a,
    {
        SlaveContext {
            address,
            addressing: Addressing::default(),
            output: Box::new(output),
            read_discrete_input: None,
            read_coil: None,
            write_coil: None,
            read_holding_register: None,
            write_holding_register: None,
            read_input_register: None,
        }
    }

    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn on_read_discrete_input<F>(mut self, f: F) -> Self
    where
        F: FnMut(u16) -> bool + 'a,
    {
        self.read_discrete_input = Some(Box::new(f));
        self
    }

    pub fn on_read_coil<F>(mut self, f: F) -> Self
    where
        F: FnMut(u16) -> bool + 'a,
    {
        self.read_coil = Some(Box::new(f));
        self
    }

    pub fn on_write_coil<F>(mut self, f: F) -> Self
    where
        F: FnMut(u16, u16) + 'a,
    {
        self.write_coil = Some(Box::new(f));
        self
    }

    pub fn on_read_holding_register<F>(mut self, f: F) -> Self
    where
        F: FnMut(u16) -> u16 + 'a,
    {
        self.read_holding_register = Some(Box::new(f));
        self
    }

    pub fn on_write_holding_register<F>(mut self, f: F) -> Self
    where
        F: FnMut(u16, u16) + 'a,
    {
        self.write_holding_register = Some(Box::new(f));
        self
    }

    pub fn on_read_input_register<F>(mut self, f: F) -> Self
    where
        F: FnMut(u16) -> u16 + 'a,
    {
        self.read_input_register = Some(Box::new(f));
        self
    }

    /// Process `input` using `scratch` as working and reply storage.
    pub fn parse_input(&mut self, input: &[u8], scratch: &mut [u8]) -> Result<Outcome, Error> {
        validate(input, scratch.len())?;
        scratch[..input.len()].copy_from_slice(input);
        self.dispatch(scratch, input.len())
    }

    pub fn parse_in_place(&mut self, buffer: &mut [u8], len: usize) -> Result<Outcome, Error> {
        if len <= CRC_SIZE {
            return Err(Error::FrameTooShort);
        }
        let frame = buffer.get(..len).ok_or(Error::BufferTooSmall)?;
        validate(frame, buffer.len())?;
        self.dispatch(buffer, len)
    }

    fn dispatch(&mut self, buf: &mut [u8], len: usize) -> Result<Outcome, Error> {
        let target = buf[0];
        let function = buf[1];
        let own = target == self.address;

        let reply_len = match function {
            READ_COILS if own => read_bits(buf, len, self.read_coil.as_mut()),
            READ_DISCRETE_INPUTS if own => read_bits(buf, len, self.read_discrete_input.as_mut()),
            READ_HOLDING_REGISTERS if own => {
                read_registers(buf, len, self.read_holding_register.as_mut())
            }
            READ_INPUT_REGISTERS if own => {
                read_registers(buf, len, self.read_input_register.as_mut())
            }
            WRITE_SINGLE_COIL if own => write_single(buf, len, self.write_coil.as_mut()),
            WRITE_SINGLE_REGISTER if own => {
                write_single(buf, len, self.write_holding_register.as_mut())
            }
            WRITE_MULTIPLE_COILS | WRITE_MULTIPLE_REGISTERS => self.write_multiple(buf, len),
            _ => None,
        };

        match reply_len {
            Some(reply_len) if reply_len > CRC_SIZE => self.reply(buf, reply_len),
            _ => {
                debug!(
                    "slave {}: ignore function 0x{:02X} for address {}",
                    self.address, function, target
                );
                Ok(Outcome::Ignored)
            }
        }
    }

    fn write_multiple(&mut self, buf: &mut [u8], len: usize) -> Option<usize> {
        let target = buf[0];
        let reply = match self.addressing {
            Addressing::Legacy => {
                if target != self.address && target == BROADCAST_ADDRESS {
                    return None;
                }
                true
            }
            Addressing::Strict => {
                if target != self.address && target != BROADCAST_ADDRESS {
                    return None;
                }
                target == self.address
            }
        };

        if len < WRITE_MULTIPLE_HEADER_LEN + CRC_SIZE {
            return None;
        }

        let start = common::read_u16(&buf[2..]);
        let count = common::read_u16(&buf[4..]) as usize;
        let coils = buf[1] == WRITE_MULTIPLE_COILS;
        let nbytes = if coils {
            common::ncoils_len(count)
        } else {
            common::nregs_len(count)
        };

        if len < WRITE_MULTIPLE_HEADER_LEN + nbytes + CRC_SIZE {
            debug!("slave {}: truncated write of {} objects", self.address, count);
            return None;
        }

        buf[0] = self.address;
        let data = &buf[WRITE_MULTIPLE_HEADER_LEN..];
        if coils {
            if let Some(hook) = self.write_coil.as_mut() {
                for i in 0..count {
                    let value = if common::get_bit(data, i) == Some(true) {
                        COIL_ON
                    } else {
                        COIL_OFF
                    };
                    hook(start.wrapping_add(i as u16), value);
                }
            }
        } else if let Some(hook) = self.write_holding_register.as_mut() {
            for i in 0..count {
                hook(start.wrapping_add(i as u16), common::read_u16(&data[2 * i..]));
            }
        }

        reply.then_some(WRITE_MULTIPLE_REPLY_LEN)
    }

    fn reply(&mut self, buf: &mut [u8], len: usize) -> Result<Outcome, Error> {
        if len > buf.len() {
            debug!("slave {}: reply of {} bytes does not fit", self.address, len);
            return Err(Error::BufferTooSmall);
        }

        append_crc(&mut buf[..len])?;
        let reply = &buf[..len];
        helpers::log_data("slave", "out", reply);
        (self.output)(reply);
        Ok(Outcome::Replied(len))
    }
}

fn validate(frame: &[u8], capacity: usize) -> Result<(), Error> {
    if frame.len() <= CRC_SIZE {
        return Err(Error::FrameTooShort);
    }

    if capacity <= CRC_SIZE || capacity < frame.len() {
        return Err(Error::BufferTooSmall);
    }

    helpers::log_data("slave", "in", frame);
    if !check_crc(frame) {
        debug!("drop frame with invalid crc");
        return Err(Error::InvalidCrc);
    }
    Ok(())
}

fn has_header(len: usize) -> bool {
    len >= REQUEST_HEADER_LEN + CRC_SIZE
}

// Returned lengths may exceed the buffer, `reply` reports that.
fn read_bits(buf: &mut [u8], len: usize, hook: Option<&mut ReadBit>) -> Option<usize> {
    let hook = hook?;
    if !has_header(len) {
        return None;
    }

    let start = common::read_u16(&buf[2..]);
    let count = common::read_u16(&buf[4..]) as usize;
    let nbytes = common::ncoils_len(count);
    let byte_count = u8::try_from(nbytes).ok()?;

    let reply_len = 3 + nbytes + CRC_SIZE;
    if reply_len > buf.len() {
        return Some(reply_len);
    }

    buf[2] = byte_count;
    common::pack_bits(&mut buf[3..], count, |i| hook(start.wrapping_add(i as u16)));
    Some(reply_len)
}

fn read_registers(buf: &mut [u8], len: usize, hook: Option<&mut ReadRegister>) -> Option<usize> {
    let hook = hook?;
    if !has_header(len) {
        return None;
    }

    let start = common::read_u16(&buf[2..]);
    let count = common::read_u16(&buf[4..]) as usize;
    if count > MAX_REPLY_REGISTERS {
        return None;
    }

    let nbytes = common::nregs_len(count);
    let reply_len = 3 + nbytes + CRC_SIZE;
    if reply_len > buf.len() {
        return Some(reply_len);
    }

    buf[2] = nbytes as u8;
    for i in 0..count {
        let value = hook(start.wrapping_add(i as u16));
        common::write_u16(&mut buf[3 + 2 * i..], value);
    }
    Some(reply_len)
}

fn write_single(buf: &mut [u8], len: usize, hook: Option<&mut Write>) -> Option<usize> {
    if !has_header(len) {
        return None;
    }

    if let Some(hook) = hook {
        hook(common::read_u16(&buf[2..]), common::read_u16(&buf[4..]));
    }
    Some(len)
}
