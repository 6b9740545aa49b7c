//! Low-level bit read, write and placement utilities for byte slices.
//!
//! A bit cursor counts bits from the start of a buffer. With
//! [`BitOrder::LsbFirst`] cursor bit `p` is bit `p % 8` of byte `p / 8`; with
//! [`BitOrder::MsbFirst`] it is bit `7 - p % 8`.
//!
//! None of these functions check lengths against the cursor. Callers size
//! buffers first; an undersized slice panics on indexing.

/// Order in which a field's bits are laid out along the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum BitOrder {
    /// The first bit read is the least significant bit of the value.
    #[default]
    LsbFirst,
    /// The first bit read is the most significant bit of the value.
    MsbFirst,
}

/// Number of bytes needed to hold `bits` bits.
pub const fn bytes_for(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Reads the bit under cursor position `bit_pos`. Returns 0 or 1.
#[inline]
pub fn read_bit_at(data: &[u8], bit_pos: usize, order: BitOrder) -> u32 {
    let byte = data[bit_pos / 8];
    let shift = match order {
        BitOrder::LsbFirst => bit_pos % 8,
        BitOrder::MsbFirst => 7 - bit_pos % 8,
    };

    ((byte >> shift) & 1) as u32
}

/// Reads `n` bits (max 32) starting at `bit_pos` into a zero-extended accumulator.
///
/// `LsbFirst` places the `i`-th bit read at accumulator bit `i`; `MsbFirst`
/// shifts each bit in from the right so the first bit read ends up highest.
///
/// # Panics
///
/// Panics if `data` holds fewer than `bit_pos + n` bits.
pub fn read_bits_at(data: &[u8], bit_pos: usize, n: usize, order: BitOrder) -> u32 {
    debug_assert!(n <= 32, "a field holds at most 32 bits");

    let mut raw = 0u32;
    match order {
        BitOrder::LsbFirst => {
            for i in 0..n {
                raw |= read_bit_at(data, bit_pos + i, order) << i;
            }
        }
        BitOrder::MsbFirst => {
            for i in 0..n {
                raw = (raw << 1) | read_bit_at(data, bit_pos + i, order);
            }
        }
    }

    raw
}

/// ORs the low `n` bits of `raw` into `out` starting at cursor 0.
///
/// This is the inverse of [`read_bits_at`] at offset 0: reading `out` back
/// with the same order yields `raw` masked to `n` bits.
///
/// # Panics
///
/// Panics if `out` is shorter than [`bytes_for`]`(n)`.
pub fn write_bits(out: &mut [u8], raw: u32, n: usize, order: BitOrder) {
    debug_assert!(n <= 32, "a field holds at most 32 bits");

    for i in 0..n {
        let bit = match order {
            BitOrder::LsbFirst => (raw >> i) & 1,
            BitOrder::MsbFirst => (raw >> (n - i - 1)) & 1,
        };
        let shift = match order {
            BitOrder::LsbFirst => i % 8,
            BitOrder::MsbFirst => 7 - i % 8,
        };
        out[i / 8] |= (bit as u8) << shift;
    }
}

/// ORs `src`, a standalone encoding produced by [`write_bits`], into `out` at
/// cursor `bit_offset`.
///
/// Every output byte combines the bits already placed there, the shifted
/// source byte and whatever spilled out of the previous source byte. The
/// shift happens in a `u16` so the spilled bits survive until the next byte
/// is written. `MsbFirst` mirrors the shift: source bytes move right and the
/// spill lands in the high bits of the following byte.
///
/// # Panics
///
/// Panics if `out` does not cover the bits `src` is placed onto.
pub fn splice(out: &mut [u8], src: &[u8], bit_offset: usize, order: BitOrder) {
    let byte_offset = bit_offset / 8;
    let byte_shift = bit_offset % 8;

    match order {
        BitOrder::LsbFirst => {
            let mut overflow: u16 = 0;
            for (i, &data) in src.iter().enumerate() {
                let mut byte = out[byte_offset + i] as u16;
                byte |= overflow;
                byte |= (data as u16) << byte_shift;
                overflow = byte >> 8;

                out[byte_offset + i] = byte as u8;
            }
            if overflow != 0 {
                out[byte_offset + src.len()] |= overflow as u8;
            }
        }
        BitOrder::MsbFirst => {
            let mut overflow: u16 = 0;
            for (i, &data) in src.iter().enumerate() {
                let wide = ((data as u16) << 8) >> byte_shift;
                let mut byte = out[byte_offset + i] as u16;
                byte |= overflow;
                byte |= wide >> 8;
                overflow = wide & 0x00ff;

                out[byte_offset + i] = byte as u8;
            }
            if overflow != 0 {
                out[byte_offset + src.len()] |= overflow as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bit_at() {
        let data = [0b0000_0001];
        assert_eq!(read_bit_at(&data, 0, BitOrder::LsbFirst), 1);
        assert_eq!(read_bit_at(&data, 0, BitOrder::MsbFirst), 0);
        assert_eq!(read_bit_at(&data, 7, BitOrder::MsbFirst), 1);
    }

    #[test]
    fn test_read_bits_lsb_first() {
        assert_eq!(read_bits_at(&[0x84, 0x0A], 0, 4, BitOrder::LsbFirst), 4);
        assert_eq!(read_bits_at(&[0x80, 0x0A], 4, 12, BitOrder::LsbFirst), 0xA8);
    }

    #[test]
    fn test_read_bits_msb_first() {
        assert_eq!(read_bits_at(&[0b1010_0000], 0, 4, BitOrder::MsbFirst), 0b1010);
        assert_eq!(read_bits_at(&[0x12, 0x34], 4, 8, BitOrder::MsbFirst), 0x23);
    }

    #[test]
    fn test_read_full_width() {
        let data = [0xEF, 0xBE, 0xAD, 0xDE];
        assert_eq!(read_bits_at(&data, 0, 32, BitOrder::LsbFirst), 0xDEAD_BEEF);
        assert_eq!(read_bits_at(&data, 0, 32, BitOrder::MsbFirst), 0xEFBE_ADDE);
    }

    #[test]
    #[should_panic]
    fn test_read_bits_out_of_bounds() {
        read_bits_at(&[0xFF], 4, 8, BitOrder::LsbFirst);
    }

    #[test]
    fn test_write_bits_masks_to_width() {
        let mut out = [0u8; 2];
        write_bits(&mut out, 0xFFFF_FFFF, 12, BitOrder::LsbFirst);
        assert_eq!(out, [0xFF, 0x0F]);

        let mut out = [0u8; 2];
        write_bits(&mut out, 0xFFFF_FFFF, 12, BitOrder::MsbFirst);
        assert_eq!(out, [0xFF, 0xF0]);
    }

    #[test]
    fn test_write_bits_inverts_read() {
        for order in [BitOrder::LsbFirst, BitOrder::MsbFirst] {
            let mut out = [0u8; 2];
            write_bits(&mut out, 0x5A3, 11, order);
            assert_eq!(read_bits_at(&out, 0, 11, order), 0x5A3);
        }
    }

    #[test]
    fn test_splice_carries_lsb_first() {
        let mut out = [0u8; 3];
        out[0] = 0b0000_0101;

        let mut src = [0u8; 2];
        write_bits(&mut src, 0xABC, 12, BitOrder::LsbFirst);
        splice(&mut out, &src, 6, BitOrder::LsbFirst);

        assert_eq!(read_bits_at(&out, 0, 6, BitOrder::LsbFirst), 0b00_0101);
        assert_eq!(read_bits_at(&out, 6, 12, BitOrder::LsbFirst), 0xABC);
        assert_eq!(out[2] >> 2, 0);
    }

    #[test]
    fn test_splice_carries_msb_first() {
        let mut out = [0u8; 3];
        out[0] = 0b1100_0000;

        let mut src = [0u8; 2];
        write_bits(&mut src, 0xABC, 12, BitOrder::MsbFirst);
        splice(&mut out, &src, 3, BitOrder::MsbFirst);

        assert_eq!(read_bits_at(&out, 0, 3, BitOrder::MsbFirst), 0b110);
        assert_eq!(read_bits_at(&out, 3, 12, BitOrder::MsbFirst), 0xABC);
        assert_eq!(out[1] & 0b0000_0001, 0);
    }

    #[test]
    fn test_bytes_for() {
        assert_eq!(bytes_for(0), 0);
        assert_eq!(bytes_for(1), 1);
        assert_eq!(bytes_for(8), 1);
        assert_eq!(bytes_for(29), 4);
    }
}
