//! Splits the serial byte stream into request frames.
//!
//! RTU has no length field, so the frame length is derived from the
//! function code. Only CRC-valid frames are emitted; bytes that can not
//! start one (replies of other slaves on the bus, noise) are skipped.
use bytes::{Buf, Bytes, BytesMut};
use codec::helpers;
use frame::*;
use log::debug;
use std::io::Error;
use tokio_util::codec::{Decoder, Encoder};

// 0x01..=0x06: address, function, two 16-bit fields, CRC
const FIXED_REQUEST_LEN: usize = 8;
// 0x0F/0x10 without data: fixed request plus byte count
const WRITE_MULTIPLE_OVERHEAD: usize = 9;
const BYTE_COUNT_POS: usize = 6;

pub struct RtuFramer {
    name: String,
}

impl Default for RtuFramer {
    fn default() -> RtuFramer {
        RtuFramer::new("serial")
    }
}

impl RtuFramer {
    pub fn new(name: &str) -> RtuFramer {
        RtuFramer {
            name: name.to_owned(),
        }
    }
}

enum Candidate {
    Frame(usize),
    Incomplete,
    Skip,
}

fn candidate(src: &[u8]) -> Candidate {
    let len = match src.get(1).copied() {
        None => return Candidate::Incomplete,
        Some(READ_COILS..=WRITE_SINGLE_REGISTER) => FIXED_REQUEST_LEN,
        Some(WRITE_MULTIPLE_COILS | WRITE_MULTIPLE_REGISTERS) => match src.get(BYTE_COUNT_POS) {
            Some(&nbytes) => WRITE_MULTIPLE_OVERHEAD + nbytes as usize,
            None => return Candidate::Incomplete,
        },
        Some(_) => return Candidate::Skip,
    };

    if len > MAX_ADU_SIZE {
        Candidate::Skip
    } else if len > src.len() {
        Candidate::Incomplete
    } else if check_crc(&src[..len]) {
        Candidate::Frame(len)
    } else {
        Candidate::Skip
    }
}

impl Decoder for RtuFramer {
    type Item = BytesMut;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // first offset that may still become a frame once more bytes arrive
        let mut pending = None;
        for offset in 0..src.len() {
            match candidate(&src[offset..]) {
                Candidate::Frame(len) => {
                    if offset > 0 {
                        debug!("{}: skip {} bytes", self.name, offset);
                        src.advance(offset);
                    }
                    let frame = src.split_to(len);
                    helpers::log_data(&self.name, "in", &frame);
                    return Ok(Some(frame));
                }
                Candidate::Incomplete => {
                    pending.get_or_insert(offset);
                }
                Candidate::Skip => {}
            }
        }

        let garbage = pending.unwrap_or(src.len());
        if garbage > 0 {
            debug!("{}: skip {} bytes", self.name, garbage);
            src.advance(garbage);
        }
        Ok(None)
    }
}

impl Encoder<Bytes> for RtuFramer {
    type Error = Error;

    fn encode(&mut self, msg: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        helpers::log_data(&self.name, "out", &msg);
        dst.extend_from_slice(&msg);
        Ok(())
    }
}
