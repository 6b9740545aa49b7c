//! `serde` support for diagnostics dumps.
//!
//! A [`Field`] serializes as its bare value. A [`Message`] serializes as
//! `{ "id": .., "valid": .., "fields": [..] }` where `valid` is the outcome of
//! the last decode and `fields` lists the values in layout order.

use serde::{
    Serialize, Serializer,
    ser::{SerializeSeq, SerializeStruct},
};

use crate::{
    field::{Field, FieldSpec},
    list::{Cons, FieldList, Nil},
    message::Message,
    observer::Observer,
};

impl<S: FieldSpec> Serialize for Field<S>
where
    S::Value: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.value().serialize(serializer)
    }
}

/// Writes each field of a list as one sequence element.
pub trait SerializeFields {
    fn serialize_fields<Q: SerializeSeq>(&self, seq: &mut Q) -> Result<(), Q::Error>;
}

impl SerializeFields for Nil {
    fn serialize_fields<Q: SerializeSeq>(&self, _: &mut Q) -> Result<(), Q::Error> {
        Ok(())
    }
}

impl<S: FieldSpec, T: SerializeFields> SerializeFields for Cons<Field<S>, T>
where
    S::Value: Serialize,
{
    fn serialize_fields<Q: SerializeSeq>(&self, seq: &mut Q) -> Result<(), Q::Error> {
        seq.serialize_element(&self.head)?;
        self.tail.serialize_fields(seq)
    }
}

struct Values<'a, F>(&'a F);

impl<F: FieldList + SerializeFields> Serialize for Values<'_, F> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut seq = serializer.serialize_seq(Some(F::LEN))?;
        self.0.serialize_fields(&mut seq)?;
        seq.end()
    }
}

impl<F: FieldList + SerializeFields, O: Observer> Serialize for Message<F, O> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut state = serializer.serialize_struct("Message", 3)?;
        state.serialize_field("id", &self.id())?;
        state.serialize_field("valid", &self.last_decode_valid())?;
        state.serialize_field("fields", &Values(self.fields()))?;
        state.end()
    }
}
