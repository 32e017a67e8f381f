//! Big-endian fields and bitmaps as laid out on the wire.
use byteorder::{BigEndian, ByteOrder};

/// Read a 16-bit value stored high byte first. `src` must hold 2 bytes.
pub fn read_u16(src: &[u8]) -> u16 {
    BigEndian::read_u16(src)
}

/// Write a 16-bit value high byte first. `dst` must hold 2 bytes.
pub fn write_u16(dst: &mut [u8], value: u16) {
    BigEndian::write_u16(dst, value)
}

pub fn ncoils_len(nobjs: usize) -> usize {
    (nobjs + 7) / 8
}

pub fn nregs_len(nobjs: usize) -> usize {
    nobjs * 2
}

pub fn get_bit(buffer: &[u8], idx: usize) -> Option<bool> {
    if idx < buffer.len() * 8 {
        let byte_idx = idx / 8;
        let offset = idx % 8;
        Some(buffer[byte_idx] & (1 << offset) > 0)
    } else {
        None
    }
}

/// Pack `nbits` values into `dst`, bit `i` goes to byte `i / 8`, position `i % 8`.
///
/// Every started byte is filled with ones first, so the bits past `nbits` in
/// the last byte are undefined. `dst` must hold `ncoils_len(nbits)` bytes.
/// Returns the number of bytes used.
pub fn pack_bits<F>(dst: &mut [u8], nbits: usize, mut bit: F) -> usize
where
    F: FnMut(usize) -> bool,
{
    for i in 0..nbits {
        let byte = &mut dst[i / 8];
        let mask = 1u8 << (i % 8);
        if i % 8 == 0 {
            *byte = 0xFF;
        }

        if bit(i) {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
    ncoils_len(nbits)
}

/// Inverse of [`pack_bits`]: fill every item of `dst` from `src`.
pub fn unpack_bits(src: &[u8], dst: &mut [bool]) {
    for (i, value) in dst.iter_mut().enumerate() {
        *value = get_bit(src, i).unwrap_or(false);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn u16_big_endian() {
        let mut buffer = [0u8; 4];
        write_u16(&mut buffer[1..], 0x1234);
        assert_eq!(buffer, [0x00, 0x12, 0x34, 0x00]);
        assert_eq!(read_u16(&buffer[1..]), 0x1234);
        assert_eq!(read_u16(&[0xFF, 0x00]), 0xFF00);
    }

    #[test]
    fn lengths() {
        assert_eq!(ncoils_len(0), 0);
        assert_eq!(ncoils_len(1), 1);
        assert_eq!(ncoils_len(8), 1);
        assert_eq!(ncoils_len(9), 2);
        assert_eq!(ncoils_len(2000), 250);
        assert_eq!(nregs_len(125), 250);
    }

    #[test]
    fn pack_known_bytes() {
        let bytes = [0xCDu8, 0x6B, 0xB2, 0x0E, 0x1B];
        let bits: Vec<bool> = (0..37).map(|i| get_bit(&bytes, i).unwrap()).collect();
        let mut packed = [0u8; 5];
        assert_eq!(pack_bits(&mut packed, bits.len(), |i| bits[i]), 5);
        assert_eq!(packed[..4], bytes[..4]);
        assert_eq!(packed[4] & 0x1F, bytes[4] & 0x1F);
    }

    #[test]
    fn pack_fills_started_byte() {
        let mut packed = [0u8; 2];
        pack_bits(&mut packed, 3, |i| i == 1);
        assert_eq!(packed[0] & 0x07, 0x02);
        assert_eq!(packed[1], 0x00);
    }

    #[test]
    fn pack_unpack() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for nbits in [0usize, 1, 7, 8, 9, 2000] {
            let bits: Vec<bool> = (0..nbits).map(|_| rng.gen()).collect();
            let mut packed = vec![0u8; ncoils_len(nbits)];
            let used = pack_bits(&mut packed, nbits, |i| bits[i]);
            assert_eq!(used, packed.len());

            let mut unpacked = vec![false; nbits];
            unpack_bits(&packed, &mut unpacked);
            assert_eq!(unpacked, bits);
        }
    }

    #[test]
    fn get_bit_out_of_range() {
        assert_eq!(get_bit(&[0x01], 0), Some(true));
        assert_eq!(get_bit(&[0x01], 8), None);
    }
}
