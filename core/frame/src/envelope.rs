use crate::{crc::crc16, Error, CRC_SIZE};

/// Check the trailing CRC of a complete frame (CRC stored low byte first).
pub fn check_crc(frame: &[u8]) -> bool {
    if frame.len() <= CRC_SIZE {
        return false;
    }

    let (body, tail) = frame.split_at(frame.len() - CRC_SIZE);
    crc16(body) == u16::from_le_bytes([tail[0], tail[1]])
}

/// Compute the CRC of everything but the last two bytes and store it there.
pub fn append_crc(frame: &mut [u8]) -> Result<(), Error> {
    if frame.len() <= CRC_SIZE {
        return Err(Error::FrameTooShort);
    }

    let (body, tail) = frame.split_at_mut(frame.len() - CRC_SIZE);
    tail.copy_from_slice(&crc16(body).to_le_bytes());
    Ok(())
}
