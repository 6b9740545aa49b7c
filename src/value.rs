//! Scalar types a [`crate::field::Field`] can hold.

use core::fmt::Debug;

/// A scalar of at most 32 bits stored by a field.
///
/// Decoding assembles bits into a zero-extended `u32` accumulator which is
/// then reinterpreted as the low [`BitValue::WIDTH`] bits of the value type.
/// A 12-bit field stored in an `i16` therefore never sign-extends: `0xFFF`
/// decodes to `4095`.
pub trait BitValue: Copy + Debug + Default + PartialEq + PartialOrd + Send + Sync + 'static {
    /// Width of the type in bits.
    const WIDTH: usize;
    /// Smallest representable value.
    const MIN: Self;
    /// Largest representable value.
    const MAX: Self;

    /// Reinterprets the low `WIDTH` bits of `raw`.
    fn from_raw(raw: u32) -> Self;

    /// Returns the bit pattern of the value, zero-extended to 32 bits.
    fn to_raw(self) -> u32;

    /// Largest value a field of `bits` bits can carry.
    ///
    /// A field as wide as its type uses the type's own maximum; `1 << 32`
    /// does not fit the accumulator.
    fn width_max(bits: usize) -> Self {
        if bits >= Self::WIDTH {
            Self::MAX
        } else {
            Self::from_raw((1u32 << bits) - 1)
        }
    }
}

macro_rules! impl_bit_value {
    ($($ty:ty => $bits:ty),+ $(,)?) => {
        $(
            impl BitValue for $ty {
                const WIDTH: usize = <$ty>::BITS as usize;
                const MIN: Self = <$ty>::MIN;
                const MAX: Self = <$ty>::MAX;

                #[inline]
                fn from_raw(raw: u32) -> Self {
                    raw as $bits as $ty
                }

                #[inline]
                fn to_raw(self) -> u32 {
                    self as $bits as u32
                }
            }
        )+
    };
}

impl_bit_value!(u8 => u8, u16 => u16, u32 => u32, i8 => u8, i16 => u16, i32 => u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_truncates() {
        assert_eq!(u8::from_raw(0x1_23), 0x23);
        assert_eq!(u16::from_raw(0xABCD_1234), 0x1234);
    }

    #[test]
    fn test_from_raw_does_not_sign_extend_sub_width() {
        assert_eq!(i16::from_raw(0x0FFF), 4095);
        assert_eq!(i16::from_raw(0xFFFF), -1);
    }

    #[test]
    fn test_to_raw_zero_extends() {
        assert_eq!((-1i16).to_raw(), 0x0000_FFFF);
        assert_eq!((-128i8).to_raw(), 0x80);
        assert_eq!(u32::MAX.to_raw(), u32::MAX);
    }

    #[test]
    fn test_width_max() {
        assert_eq!(u16::width_max(12), 4095);
        assert_eq!(u8::width_max(4), 15);
        assert_eq!(u32::width_max(32), u32::MAX);
        assert_eq!(i32::width_max(32), i32::MAX);
        assert_eq!(i16::width_max(16), i16::MAX);
        assert_eq!(i16::width_max(15), i16::MAX);
    }
}
