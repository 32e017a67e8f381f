//! Master side: one blocking request/reply transaction per call.
//!
//! Transactions are not serialised here. Only one may be in flight per
//! shared bus, the caller has to ensure that.
use crate::helpers;
use frame::common;
use frame::*;
use log::debug;

// address, function, start, count, CRC
const REQUEST_LEN: usize = 8;
// address, function, byte count, CRC
const READ_REPLY_OVERHEAD: usize = 5;
// multi-write request overhead: header, byte count, CRC
const WRITE_REQUEST_OVERHEAD: usize = 9;
// echo of address, function, start and count/value
const WRITE_REPLY_LEN: usize = 8;

pub trait Transport {
    fn transmit(&mut self, frame: &[u8]);
    /// Returns the number of received bytes, 0 on timeout.
    fn request_reply(&mut self, buffer: &mut [u8]) -> usize;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn transmit(&mut self, frame: &[u8]) {
        (**self).transmit(frame)
    }

    fn request_reply(&mut self, buffer: &mut [u8]) -> usize {
        (**self).request_reply(buffer)
    }
}

pub struct Master<T> {
    slave: u8,
    transport: T,
}

impl<T: Transport> Master<T> {
    pub fn new(slave: u8, transport: T) -> Master<T> {
        Master { slave, transport }
    }

    pub fn read_coils(
        &mut self,
        start: u16,
        data: &mut [bool],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.read_bits(READ_COILS, start, data, buffer)
    }

    pub fn read_discrete_inputs(
        &mut self,
        start: u16,
        data: &mut [bool],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.read_bits(READ_DISCRETE_INPUTS, start, data, buffer)
    }

    pub fn read_holding_registers(
        &mut self,
        start: u16,
        data: &mut [u16],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.read_registers(READ_HOLDING_REGISTERS, start, data, buffer)
    }

    pub fn read_input_registers(
        &mut self,
        start: u16,
        data: &mut [u16],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.read_registers(READ_INPUT_REGISTERS, start, data, buffer)
    }

    /// Write `data.len()` coils. A single coil goes out as 0x05, more as 0x0F.
    pub fn write_coils(
        &mut self,
        start: u16,
        data: &[bool],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        check_count(data.len(), MAX_WRITE_COILS)?;
        if data.len() == 1 {
            let value = if data[0] { COIL_ON } else { COIL_OFF };
            return self.write_single(WRITE_SINGLE_COIL, start, value, buffer);
        }

        let nbytes = common::ncoils_len(data.len());
        let request_len = WRITE_REQUEST_OVERHEAD + nbytes;
        check_capacity(buffer, request_len, WRITE_REPLY_LEN)?;

        self.encode_header(buffer, WRITE_MULTIPLE_COILS, start, data.len() as u16);
        buffer[6] = nbytes as u8;
        common::pack_bits(&mut buffer[7..], data.len(), |i| data[i]);
        self.transact(buffer, request_len, WRITE_REPLY_LEN)
    }

    pub fn write_holding_registers(
        &mut self,
        start: u16,
        data: &[u16],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        check_count(data.len(), MAX_WRITE_REGISTERS)?;
        if data.len() == 1 {
            return self.write_single(WRITE_SINGLE_REGISTER, start, data[0], buffer);
        }

        let nbytes = common::nregs_len(data.len());
        let request_len = WRITE_REQUEST_OVERHEAD + nbytes;
        check_capacity(buffer, request_len, WRITE_REPLY_LEN)?;

        self.encode_header(buffer, WRITE_MULTIPLE_REGISTERS, start, data.len() as u16);
        buffer[6] = nbytes as u8;
        for (i, value) in data.iter().enumerate() {
            common::write_u16(&mut buffer[7 + 2 * i..], *value);
        }
        self.transact(buffer, request_len, WRITE_REPLY_LEN)
    }

    fn read_bits(
        &mut self,
        function: u8,
        start: u16,
        data: &mut [bool],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        check_count(data.len(), MAX_READ_COILS)?;
        let reply_len = READ_REPLY_OVERHEAD + common::ncoils_len(data.len());
        check_capacity(buffer, REQUEST_LEN, reply_len)?;

        self.encode_header(buffer, function, start, data.len() as u16);
        self.transact(buffer, REQUEST_LEN, reply_len)?;
        common::unpack_bits(&buffer[3..], data);
        Ok(())
    }

    fn read_registers(
        &mut self,
        function: u8,
        start: u16,
        data: &mut [u16],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        check_count(data.len(), MAX_READ_REGISTERS)?;
        let reply_len = READ_REPLY_OVERHEAD + common::nregs_len(data.len());
        check_capacity(buffer, REQUEST_LEN, reply_len)?;

        self.encode_header(buffer, function, start, data.len() as u16);
        self.transact(buffer, REQUEST_LEN, reply_len)?;
        for (i, value) in data.iter_mut().enumerate() {
            *value = common::read_u16(&buffer[3 + 2 * i..]);
        }
        Ok(())
    }

    fn write_single(
        &mut self,
        function: u8,
        address: u16,
        value: u16,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        check_capacity(buffer, REQUEST_LEN, WRITE_REPLY_LEN)?;
        self.encode_header(buffer, function, address, value);
        self.transact(buffer, REQUEST_LEN, WRITE_REPLY_LEN)
    }

    fn encode_header(&self, buffer: &mut [u8], function: u8, address: u16, value: u16) {
        buffer[0] = self.slave;
        buffer[1] = function;
        common::write_u16(&mut buffer[2..], address);
        common::write_u16(&mut buffer[4..], value);
    }

    fn transact(
        &mut self,
        buffer: &mut [u8],
        request_len: usize,
        reply_len: usize,
    ) -> Result<(), Error> {
        let request = &mut buffer[..request_len];
        append_crc(request)?;
        helpers::log_data("master", "out", request);
        self.transport.transmit(request);

        let reply = &mut buffer[..reply_len];
        let received = self.transport.request_reply(reply);
        if received != reply_len {
            debug!(
                "master: slave {} replied with {} bytes, expected {}",
                self.slave, received, reply_len
            );
            return Err(Error::UnexpectedLength {
                expected: reply_len,
                actual: received,
            });
        }

        helpers::log_data("master", "in", reply);
        if !check_crc(reply) {
            debug!("master: invalid crc in reply from slave {}", self.slave);
            return Err(Error::InvalidCrc);
        }
        Ok(())
    }
}

fn check_count(count: usize, max: usize) -> Result<(), Error> {
    if count == 0 {
        Err(Error::InvalidArgument)
    } else if count > max {
        Err(Error::TooManyObjects)
    } else {
        Ok(())
    }
}

fn check_capacity(buffer: &[u8], request_len: usize, reply_len: usize) -> Result<(), Error> {
    if request_len > buffer.len() || reply_len > buffer.len() {
        Err(Error::BufferTooSmall)
    } else {
        Ok(())
    }
}
