//! A single bit range of a message, decoded into a typed and validated value.
//!
//! A field's layout lives in a [`FieldSpec`]: a zero-sized marker type that
//! fixes the value type, the width in bits, the bit order and a numeric id.
//! The marker type is also the key a [`crate::message::Message`] uses to
//! address the field, so every field of a message needs its own spec type.
//! [`crate::field_spec!`] declares one.

use core::{cmp::Ordering, fmt};
use std::sync::Arc;

use crate::{
    bits::{self, BitOrder},
    value::BitValue,
};

/// Compile-time description of a field.
pub trait FieldSpec: 'static {
    /// Type the decoded bits are stored in.
    type Value: BitValue;
    /// Width of the field in bits. At most 32 and at most the width of `Value`.
    const BITS: usize;
    /// Bit order along the message cursor.
    const ORDER: BitOrder = BitOrder::LsbFirst;
    /// Numeric id used for diagnostics only.
    const ID: u32 = 0;
}

/// Predicate run against every new value of a field.
///
/// It may rewrite the field (see [`Field::clamp`]); the returned flag becomes
/// the field's validity.
pub type Condition<S> = Arc<dyn Fn(&mut Field<S>, <S as FieldSpec>::Value) -> bool + Send + Sync>;

/// A value of `S::BITS` bits together with its validity predicate.
pub struct Field<S: FieldSpec> {
    value: S::Value,
    valid: bool,
    /// `None` selects the width bound check.
    condition: Option<Condition<S>>,
}

impl<S: FieldSpec> Field<S> {
    /// Width of the field in bits.
    pub const BITS: usize = S::BITS;
    /// Size of [`Field::encode`]'s output.
    pub const BYTES: usize = bits::bytes_for(S::BITS);
    /// Bit order along the message cursor.
    pub const ORDER: BitOrder = S::ORDER;

    const WIDTH_CHECK: () = assert!(
        S::BITS <= 32 && S::BITS <= <S::Value as BitValue>::WIDTH,
        "field width exceeds 32 bits or its value type"
    );

    fn with_condition(condition: Option<Condition<S>>) -> Self {
        let () = Self::WIDTH_CHECK;

        Field {
            value: S::Value::default(),
            valid: false,
            condition,
        }
    }

    /// A field that accepts any value its width can carry.
    pub fn any() -> Self {
        Self::with_condition(None)
    }

    /// An unconstrained field holding `value`, validated immediately.
    pub fn with_value(value: S::Value) -> Self {
        let mut field = Self::any();
        field.set(value);
        field
    }

    /// An unconstrained field decoded from `data` at `bit_offset`.
    ///
    /// # Panics
    ///
    /// Panics if `data` holds fewer than `bit_offset + S::BITS` bits.
    pub fn from_bytes(data: &[u8], bit_offset: usize) -> Self {
        let mut field = Self::any();
        field.decode(data, bit_offset);
        field
    }

    /// A field whose validity is decided by `condition`.
    ///
    /// The predicate receives the field and the candidate value. It may
    /// overwrite the value through [`Field::force`].
    pub fn condition<C>(condition: C) -> Self
    where
        C: Fn(&mut Field<S>, S::Value) -> bool + Send + Sync + 'static,
    {
        Self::with_condition(Some(Arc::new(condition)))
    }

    /// Valid iff the value equals `expected`.
    pub fn equal_to(expected: S::Value) -> Self {
        Self::condition(move |_, v| v == expected)
    }

    /// Valid iff the value equals one of `expected`.
    pub fn equal_to_any<const N: usize>(expected: [S::Value; N]) -> Self {
        Self::condition(move |_, v| expected.contains(&v))
    }

    /// Valid iff the value differs from `other`.
    pub fn not_equal_to(other: S::Value) -> Self {
        Self::condition(move |_, v| v != other)
    }

    /// Valid iff the value is above `bound`.
    pub fn greater_than(bound: S::Value) -> Self {
        Self::condition(move |_, v| v > bound)
    }

    /// Valid iff the value is below `bound`.
    pub fn less_than(bound: S::Value) -> Self {
        Self::condition(move |_, v| v < bound)
    }

    /// Valid iff the value is at least `bound`.
    pub fn greater_equal_to(bound: S::Value) -> Self {
        Self::condition(move |_, v| v >= bound)
    }

    /// Valid iff the value is at most `bound`.
    pub fn less_equal_to(bound: S::Value) -> Self {
        Self::condition(move |_, v| v <= bound)
    }

    /// Valid iff `min <= value <= max`.
    pub fn between(min: S::Value, max: S::Value) -> Self {
        Self::condition(move |_, v| v >= min && v <= max)
    }

    /// Always valid; values outside `[min, max]` are replaced by the nearest
    /// bound.
    pub fn clamp(min: S::Value, max: S::Value) -> Self {
        Self::condition(move |field, v| {
            if v < min {
                field.force(min);
            } else if v > max {
                field.force(max);
            }
            true
        })
    }

    /// Replaces the predicate. The validity flag is left as is until the
    /// value changes again.
    pub fn set_condition<C>(&mut self, condition: C) -> &mut Self
    where
        C: Fn(&mut Field<S>, S::Value) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    pub fn value(&self) -> S::Value {
        self.value
    }

    /// Result of the last predicate evaluation. `false` until a value is set.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn id(&self) -> u32 {
        S::ID
    }

    /// Stores `value` and re-runs the predicate. Returns the new validity.
    pub fn set(&mut self, value: S::Value) -> bool {
        self.value = value;
        self.validate();
        self.valid
    }

    /// Stores `value` and marks the field valid without running the predicate.
    pub fn force(&mut self, value: S::Value) {
        self.value = value;
        self.valid = true;
    }

    /// Decodes `S::BITS` bits from `data` starting at `bit_offset`, then runs
    /// the predicate. Returns the new validity.
    ///
    /// The accumulated bits are reinterpreted as the value type without any
    /// numeric conversion (see [`BitValue::from_raw`]).
    ///
    /// # Panics
    ///
    /// Panics if `data` holds fewer than `bit_offset + S::BITS` bits. A
    /// [`crate::message::Message`] checks this before touching its fields.
    pub fn decode(&mut self, data: &[u8], bit_offset: usize) -> bool {
        let raw = bits::read_bits_at(data, bit_offset, S::BITS, S::ORDER);
        self.set(S::Value::from_raw(raw))
    }

    /// Encodes the value into [`Field::BYTES`] bytes, as [`Field::decode`]
    /// would read them at offset 0.
    ///
    /// Encoding never validates; an invalid field still produces output.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::BYTES];
        bits::write_bits(&mut out, self.value.to_raw(), S::BITS, S::ORDER);
        out
    }

    /// ORs the encoded value into `out` at cursor `bit_offset`.
    ///
    /// # Panics
    ///
    /// Panics if `out` holds fewer than `bit_offset + S::BITS` bits.
    pub fn encode_into(&self, out: &mut [u8], bit_offset: usize) {
        let mut scratch = [0u8; 4];
        bits::write_bits(&mut scratch, self.value.to_raw(), S::BITS, S::ORDER);
        bits::splice(out, &scratch[..Self::BYTES], bit_offset, S::ORDER);
    }

    fn validate(&mut self) {
        let value = self.value;
        self.valid = match self.condition.clone() {
            Some(condition) => condition(self, value),
            None => within_width::<S>(value),
        };
    }
}

/// Bound check used when no predicate is supplied.
fn within_width<S: FieldSpec>(value: S::Value) -> bool {
    value >= S::Value::MIN && value <= S::Value::width_max(S::BITS)
}

impl<S: FieldSpec> Default for Field<S> {
    fn default() -> Self {
        Self::any()
    }
}

impl<S: FieldSpec> Clone for Field<S> {
    fn clone(&self) -> Self {
        Field {
            value: self.value,
            valid: self.valid,
            condition: self.condition.clone(),
        }
    }
}

impl<S: FieldSpec> fmt::Debug for Field<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &S::ID)
            .field("bits", &S::BITS)
            .field("order", &S::ORDER)
            .field("value", &self.value)
            .field("valid", &self.valid)
            .finish()
    }
}

impl<S: FieldSpec> PartialEq for Field<S> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<S: FieldSpec> PartialOrd for Field<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

// Comparisons against a bare value, one pair per value type.
macro_rules! impl_value_cmp {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<S: FieldSpec<Value = $ty>> PartialEq<$ty> for Field<S> {
                fn eq(&self, other: &$ty) -> bool {
                    self.value == *other
                }
            }

            impl<S: FieldSpec<Value = $ty>> PartialOrd<$ty> for Field<S> {
                fn partial_cmp(&self, other: &$ty) -> Option<Ordering> {
                    self.value.partial_cmp(other)
                }
            }
        )+
    };
}

impl_value_cmp!(u8, u16, u32, i8, i16, i32);

/// Declares a zero-sized [`FieldSpec`] marker type.
///
/// ```
/// bitmsg::field_spec!(
///     /// Frame priority, 3 bits, most significant bit first.
///     pub Priority: u8 [3], order = MsbFirst, id = 1
/// );
///
/// use bitmsg::field::FieldSpec;
/// assert_eq!(Priority::BITS, 3);
/// assert_eq!(Priority::ID, 1);
/// ```
#[macro_export]
macro_rules! field_spec {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident : $value:ty [$bits:expr]
        $(, order = $order:ident)?
        $(, id = $id:expr)?
        $(;)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::field::FieldSpec for $name {
            type Value = $value;
            const BITS: usize = $bits;
            $(const ORDER: $crate::bits::BitOrder = $crate::bits::BitOrder::$order;)?
            $(const ID: u32 = $id;)?
        }
    };
}
