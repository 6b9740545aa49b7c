//! Ordered, heterogeneous list of fields.
//!
//! A message's layout is a [`Cons`] chain of [`Field`]s terminated by [`Nil`].
//! The chain is a plain value, so the message owns its fields outright, and
//! every property of the layout (field count, total width, which field sits
//! where) is known at compile time. [`crate::fields!`] builds a list and
//! [`crate::Fields!`] names its type.

use core::marker::PhantomData;

use crate::{
    bits::BitOrder,
    errors::DecodeError,
    field::{Field, FieldSpec},
    observer::Observer,
};

/// End of a field list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nil;

/// A field followed by the rest of the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cons<H, T> {
    pub head: H,
    pub tail: T,
}

/// Sequential decode and encode over a list of fields.
pub trait FieldList {
    /// Number of fields.
    const LEN: usize;
    /// Sum of the field widths.
    const BITS: usize;
    /// Bit order of the first field; `None` for an empty list.
    const LEAD_ORDER: Option<BitOrder>;
    /// Cursor phases (position modulo 8, one bit per phase) at which the bit
    /// order changes from one field to the next.
    ///
    /// `LsbFirst` and `MsbFirst` address opposite ends of a byte, so a change
    /// in the middle of a byte makes two fields share physical bits. Only
    /// phase 0 (`ORDER_BREAKS <= 1`) is a layout that round-trips.
    const ORDER_BREAKS: u8;

    /// Decodes every field in order starting at `bit_offset`, stopping at the
    /// first field whose predicate rejects its value.
    ///
    /// The caller guarantees `data` holds `bit_offset + Self::BITS` bits.
    fn decode_fields<O: Observer>(
        &mut self,
        data: &[u8],
        bit_offset: usize,
        message_id: u32,
    ) -> Result<(), DecodeError>;

    /// ORs every field into `out` in order starting at `bit_offset`.
    fn encode_fields(&self, out: &mut [u8], bit_offset: usize);

    /// Id of the first field whose validity flag is false.
    fn first_invalid(&self) -> Option<u32>;
}

impl FieldList for Nil {
    const LEN: usize = 0;
    const BITS: usize = 0;
    const LEAD_ORDER: Option<BitOrder> = None;
    const ORDER_BREAKS: u8 = 0;

    fn decode_fields<O: Observer>(&mut self, _: &[u8], _: usize, _: u32) -> Result<(), DecodeError> {
        Ok(())
    }

    fn encode_fields(&self, _: &mut [u8], _: usize) {}

    fn first_invalid(&self) -> Option<u32> {
        None
    }
}

impl<S: FieldSpec, T: FieldList> FieldList for Cons<Field<S>, T> {
    const LEN: usize = 1 + T::LEN;
    const BITS: usize = S::BITS + T::BITS;
    const LEAD_ORDER: Option<BitOrder> = Some(S::ORDER);
    const ORDER_BREAKS: u8 = {
        let phase = (S::BITS % 8) as u32;
        let shifted = T::ORDER_BREAKS.rotate_left(phase);
        match T::LEAD_ORDER {
            Some(next) if next as u8 != S::ORDER as u8 => shifted | (1u8 << phase),
            _ => shifted,
        }
    };

    fn decode_fields<O: Observer>(
        &mut self,
        data: &[u8],
        bit_offset: usize,
        message_id: u32,
    ) -> Result<(), DecodeError> {
        if !self.head.decode(data, bit_offset) {
            O::field_decode_failed(message_id, S::ID);
            return Err(DecodeError::FieldRejected { field_id: S::ID });
        }
        O::field_decoded(message_id, S::ID);

        self.tail
            .decode_fields::<O>(data, bit_offset + S::BITS, message_id)
    }

    fn encode_fields(&self, out: &mut [u8], bit_offset: usize) {
        self.head.encode_into(out, bit_offset);
        self.tail.encode_fields(out, bit_offset + S::BITS);
    }

    fn first_invalid(&self) -> Option<u32> {
        if !self.head.is_valid() {
            return Some(S::ID);
        }
        self.tail.first_invalid()
    }
}

/// Index of a field at the head of a list.
pub struct Here;

/// Index of a field somewhere in the tail of a list.
pub struct There<I>(PhantomData<I>);

/// Lookup of the field keyed by `S`.
///
/// `I` is inferred and never named by callers: write `get::<Spec, _>()`.
/// If `S` keys two fields of the same list the index is ambiguous and the
/// lookup does not compile.
pub trait Contains<S: FieldSpec, I> {
    fn field(&self) -> &Field<S>;
    fn field_mut(&mut self) -> &mut Field<S>;
}

impl<S: FieldSpec, T> Contains<S, Here> for Cons<Field<S>, T> {
    fn field(&self) -> &Field<S> {
        &self.head
    }

    fn field_mut(&mut self) -> &mut Field<S> {
        &mut self.head
    }
}

impl<S: FieldSpec, H, T: Contains<S, I>, I> Contains<S, There<I>> for Cons<H, T> {
    fn field(&self) -> &Field<S> {
        self.tail.field()
    }

    fn field_mut(&mut self) -> &mut Field<S> {
        self.tail.field_mut()
    }
}

/// Concatenation of two field lists, `Self` first.
pub trait Append<R> {
    type Output;

    fn append(self, rest: R) -> Self::Output;
}

impl<R> Append<R> for Nil {
    type Output = R;

    fn append(self, rest: R) -> R {
        rest
    }
}

impl<H, T: Append<R>, R> Append<R> for Cons<H, T> {
    type Output = Cons<H, T::Output>;

    fn append(self, rest: R) -> Self::Output {
        Cons {
            head: self.head,
            tail: self.tail.append(rest),
        }
    }
}

/// Builds a field list value: `fields![Field::<A>::any(), Field::<B>::equal_to(1)]`.
#[macro_export]
macro_rules! fields {
    () => { $crate::list::Nil };
    ($head:expr $(, $tail:expr)* $(,)?) => {
        $crate::list::Cons {
            head: $head,
            tail: $crate::fields!($($tail),*),
        }
    };
}

/// Names the type of a field list by its specs: `Fields![A, B]`.
#[macro_export]
macro_rules! Fields {
    () => { $crate::list::Nil };
    ($head:ty $(, $tail:ty)* $(,)?) => {
        $crate::list::Cons<$crate::field::Field<$head>, $crate::Fields!($($tail),*)>
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;

    crate::field_spec!(A: u8 [3], id = 1);
    crate::field_spec!(B: u16 [9], id = 2);
    crate::field_spec!(C: u8 [4], id = 3);

    fn list() -> crate::Fields![A, B, C] {
        crate::fields![Field::any(), Field::between(0, 100), Field::any()]
    }

    #[test]
    fn test_compile_time_sizes() {
        assert_eq!(<crate::Fields![A, B, C] as FieldList>::LEN, 3);
        assert_eq!(<crate::Fields![A, B, C] as FieldList>::BITS, 16);
        assert_eq!(<Nil as FieldList>::BITS, 0);
    }

    crate::field_spec!(LowNibble: u8 [4]);
    crate::field_spec!(HighNibble: u8 [4], order = MsbFirst);
    crate::field_spec!(MsbByte: u8 [8], order = MsbFirst);

    #[test]
    fn test_order_breaks() {
        assert_eq!(<crate::Fields![A, B, C] as FieldList>::ORDER_BREAKS, 0);
        assert_eq!(<Nil as FieldList>::LEAD_ORDER, None);
        assert_eq!(
            <crate::Fields![HighNibble, A] as FieldList>::LEAD_ORDER,
            Some(BitOrder::MsbFirst)
        );

        // order changes at cursor 4
        assert_eq!(
            <crate::Fields![LowNibble, HighNibble] as FieldList>::ORDER_BREAKS,
            0b0001_0000
        );
        // changes at cursors 8 and 16
        assert_eq!(
            <crate::Fields![LowNibble, C, MsbByte, B] as FieldList>::ORDER_BREAKS,
            0b0000_0001
        );
        // changes at cursors 4 and 12 share a phase
        assert_eq!(
            <crate::Fields![C, MsbByte, A] as FieldList>::ORDER_BREAKS,
            0b0001_0000
        );
    }

    #[test]
    fn test_lookup_by_type() {
        let mut fields = list();
        Contains::<B, _>::field_mut(&mut fields).set(42);

        let b: &Field<B> = fields.field();
        assert_eq!(b.value(), 42);
        let c: &Field<C> = fields.field();
        assert!(!c.is_valid());
    }

    #[test]
    fn test_decode_advances_cursor() {
        let mut fields = list();
        // a = 0b101, b = 0b0_0000_1010, c = 0b1001
        let data = [0b0101_0101, 0b1001_0000];
        assert_eq!(fields.decode_fields::<NoopObserver>(&data, 0, 0), Ok(()));

        let a: &Field<A> = fields.field();
        let b: &Field<B> = fields.field();
        let c: &Field<C> = fields.field();
        assert_eq!(a.value(), 0b101);
        assert_eq!(b.value(), 0b1010);
        assert_eq!(c.value(), 0b1001);
    }

    #[test]
    fn test_decode_stops_at_rejected_field() {
        let mut fields = list();
        let data = [0xFF, 0xFF];
        assert_eq!(
            fields.decode_fields::<NoopObserver>(&data, 0, 0),
            Err(DecodeError::FieldRejected { field_id: 2 })
        );

        let c: &Field<C> = fields.field();
        assert_eq!(c.value(), 0);
        assert_eq!(fields.first_invalid(), Some(2));
    }

    #[test]
    fn test_encode_fields() {
        let mut fields = list();
        Contains::<A, _>::field_mut(&mut fields).set(0b101);
        Contains::<B, _>::field_mut(&mut fields).set(0b1010);
        Contains::<C, _>::field_mut(&mut fields).set(0b1001);

        let mut out = [0u8; 2];
        fields.encode_fields(&mut out, 0);
        assert_eq!(out, [0b0101_0101, 0b1001_0000]);
    }

    #[test]
    fn test_append() {
        let head: crate::Fields![A] = crate::fields![Field::with_value(5)];
        let tail: crate::Fields![B, C] = crate::fields![Field::any(), Field::with_value(2)];

        let joined: crate::Fields![A, B, C] = head.append(tail);
        assert_eq!(<crate::Fields![A, B, C] as FieldList>::BITS, 16);

        let a: &Field<A> = joined.field();
        let c: &Field<C> = joined.field();
        assert_eq!(a.value(), 5);
        assert_eq!(c.value(), 2);
    }
}
