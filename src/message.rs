//! Message: a fixed layout of fields decoded and encoded as one unit.

use core::{fmt, marker::PhantomData};
use std::sync::Arc;

use crate::{
    bits,
    errors::{DecodeError, EncodeError},
    field::{Field, FieldSpec},
    list::{Append, Contains, FieldList},
    observer::{NoopObserver, Observer},
};

/// Called with the message after a decode that ended valid.
pub type Callback<F, O> = Arc<dyn Fn(&Message<F, O>) + Send + Sync>;

/// Cross-field check run after every field decoded successfully.
pub type Validator<F, O> = Arc<dyn Fn(&Message<F, O>) -> bool + Send + Sync>;

/// A fixed-layout record built from the field list `F`.
///
/// Fields are decoded in declaration order with a running bit cursor; the
/// first field that rejects its value stops the decode. `O` receives the
/// diagnostic hooks and is bound at the type level.
///
/// ```
/// use bitmsg::{field_spec, fields, Field, Message};
///
/// field_spec!(First: u16 [4]);
/// field_spec!(Second: u16 [12]);
///
/// let mut msg = Message::new(0u32, fields![Field::<First>::between(0, 2), Field::<Second>::any()]);
///
/// assert!(!msg.decode(&[0x84, 0x0A], 0));
/// assert!(msg.decode(&[0x80, 0x0A], 0));
/// assert_eq!(msg.value_of::<Second, _>(), 168);
/// assert_eq!(msg.encode(), vec![0x80, 0x0A]);
/// ```
///
/// Fields of both bit orders may share a layout as long as the order only
/// changes on a byte boundary. Anything else fails to compile:
///
/// ```compile_fail
/// use bitmsg::{field_spec, fields, Field, Fields, Message};
///
/// field_spec!(Low: u8 [4]);
/// field_spec!(High: u8 [4], order = MsbFirst);
///
/// let _: Message<Fields![Low, High]> = Message::new(0u32, fields![Field::any(), Field::any()]);
/// ```
pub struct Message<F: FieldList, O: Observer = NoopObserver> {
    id: u32,
    fields: F,
    /// Outcome of the last decode.
    valid: bool,
    callback: Option<Callback<F, O>>,
    validator: Option<Validator<F, O>>,
    _observer: PhantomData<fn() -> O>,
}

impl<F: FieldList> Message<F> {
    /// A message that reports to [`NoopObserver`].
    pub fn new(id: impl Into<u32>, fields: F) -> Self {
        Self::with_observer(id, fields)
    }
}

impl<F: FieldList, O: Observer> Message<F, O> {
    /// Number of fields.
    pub const LEN: usize = F::LEN;
    /// Total width of the layout in bits.
    pub const BITS: usize = F::BITS;
    /// Size of [`Message::encode`]'s output.
    pub const BYTES: usize = bits::bytes_for(F::BITS);

    const LAYOUT_CHECK: () = assert!(
        F::ORDER_BREAKS <= 1,
        "bit order may only change on a byte boundary"
    );

    /// A message reporting to the observer named by its type, e.g.
    /// `Message::<_, TracingObserver>::with_observer(id, fields)`.
    pub fn with_observer(id: impl Into<u32>, fields: F) -> Self {
        let () = Self::LAYOUT_CHECK;

        Message {
            id: id.into(),
            fields,
            valid: false,
            callback: None,
            validator: None,
            _observer: PhantomData,
        }
    }

    pub fn with_callback(mut self, callback: impl Fn(&Self) + Send + Sync + 'static) -> Self {
        self.set_callback(callback);
        self
    }

    pub fn with_validator(
        mut self,
        validator: impl Fn(&Self) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.set_validator(validator);
        self
    }

    pub fn set_callback(&mut self, callback: impl Fn(&Self) + Send + Sync + 'static) -> &mut Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn set_validator(
        &mut self,
        validator: impl Fn(&Self) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut F {
        &mut self.fields
    }

    pub fn into_fields(self) -> F {
        self.fields
    }

    /// The field keyed by `S`. Call as `msg.get::<Spec, _>()`.
    pub fn get<S: FieldSpec, I>(&self) -> &Field<S>
    where
        F: Contains<S, I>,
    {
        self.fields.field()
    }

    pub fn get_mut<S: FieldSpec, I>(&mut self) -> &mut Field<S>
    where
        F: Contains<S, I>,
    {
        self.fields.field_mut()
    }

    pub fn value_of<S: FieldSpec, I>(&self) -> S::Value
    where
        F: Contains<S, I>,
    {
        self.get::<S, I>().value()
    }

    /// Replaces the predicate of the field keyed by `S`.
    pub fn set_condition<S: FieldSpec, I>(
        &mut self,
        condition: impl Fn(&mut Field<S>, S::Value) -> bool + Send + Sync + 'static,
    ) -> &mut Self
    where
        F: Contains<S, I>,
    {
        self.get_mut::<S, I>().set_condition(condition);
        self
    }

    /// Swaps in `field`, predicate and all, for the field keyed by `S`.
    pub fn replace<S: FieldSpec, I>(&mut self, field: Field<S>) -> &mut Self
    where
        F: Contains<S, I>,
    {
        *self.get_mut::<S, I>() = field;
        self
    }

    /// Decodes the message from `data`, starting `bit_offset` bits in.
    ///
    /// 1. Fails with [`DecodeError::BufferTooShort`] before touching any
    ///    field if fewer than [`Message::BITS`] bits remain after the offset.
    /// 2. Decodes the fields in order, stopping at the first one whose
    ///    predicate rejects its value. Fields after it keep their values.
    /// 3. Runs the validator, if any, once every field has decoded.
    /// 4. Runs the callback, if any, when the outcome is valid.
    ///
    /// # Panics
    ///
    /// Panics if the layout mixes bit orders and `bit_offset` is not a
    /// multiple of 8, since the order changes would then fall mid-byte.
    pub fn try_decode(&mut self, data: &[u8], bit_offset: usize) -> Result<(), DecodeError> {
        assert!(
            F::ORDER_BREAKS == 0 || bit_offset % 8 == 0,
            "mixed bit order layout decoded at unaligned offset {bit_offset}"
        );
        O::decode_start(self.id);

        let available = (data.len() * 8).saturating_sub(bit_offset);
        if available < F::BITS {
            self.valid = false;
            O::buffer_too_short(self.id, available, F::BITS);
            return Err(DecodeError::BufferTooShort {
                available,
                required: F::BITS,
            });
        }

        let decoded = self.fields.decode_fields::<O>(data, bit_offset, self.id);
        O::decode_end(self.id);

        let result = match decoded {
            Ok(()) => match &self.validator {
                Some(validator) if !validator(&*self) => Err(DecodeError::MessageRejected {
                    message_id: self.id,
                }),
                _ => Ok(()),
            },
            Err(err) => Err(err),
        };

        self.valid = result.is_ok();
        if self.valid {
            self.run_callback();
        }

        result
    }

    /// [`Message::try_decode`] reduced to its success flag.
    pub fn decode(&mut self, data: &[u8], bit_offset: usize) -> bool {
        self.try_decode(data, bit_offset).is_ok()
    }

    pub fn decode_array<const N: usize>(&mut self, data: &[u8; N], bit_offset: usize) -> bool {
        self.decode(data.as_slice(), bit_offset)
    }

    /// Outcome recorded by the last decode.
    pub fn last_decode_valid(&self) -> bool {
        self.valid
    }

    /// Recomputes validity from the current state: every field's flag must be
    /// set and the validator, if any, must accept the message.
    ///
    /// This reads the flags as they are now. After a decode that stopped
    /// early, fields it never reached still carry the flag of their previous
    /// value, so this can disagree with [`Message::last_decode_valid`].
    pub fn is_valid(&self) -> bool {
        if let Some(field_id) = self.fields.first_invalid() {
            O::field_invalid(self.id, field_id);
            return false;
        }

        match &self.validator {
            Some(validator) => validator(self),
            None => true,
        }
    }

    pub fn run_callback(&self) {
        if let Some(callback) = &self.callback {
            callback(self);
        }
    }

    /// Encodes every field in order into [`Message::BYTES`] bytes.
    ///
    /// No validation happens here; fields are written as they are.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::BYTES];
        self.fields.encode_fields(&mut out, 0);
        out
    }

    /// Encodes into the front of `out`, zeroing it first. Returns the number
    /// of bytes written.
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize, EncodeError> {
        let available = out.len();
        let Some(out) = out.get_mut(..Self::BYTES) else {
            return Err(EncodeError::BufferTooShort {
                available,
                required: Self::BYTES,
            });
        };

        out.fill(0);
        self.fields.encode_fields(out, 0);

        Ok(Self::BYTES)
    }

    /// A new message whose layout is this one's fields followed by `extra`.
    ///
    /// The observer carries over. Callback and validator do not, since they
    /// are typed against this layout; attach new ones to the result.
    pub fn concat<G>(&self, id: impl Into<u32>, extra: G) -> Message<<F as Append<G>>::Output, O>
    where
        F: Append<G> + Clone,
        <F as Append<G>>::Output: FieldList,
    {
        Message::with_observer(id, self.fields.clone().append(extra))
    }
}

impl<F: FieldList + Default, O: Observer> Default for Message<F, O> {
    fn default() -> Self {
        Message::with_observer(0u32, F::default())
    }
}

impl<F: FieldList + Clone, O: Observer> Clone for Message<F, O> {
    fn clone(&self) -> Self {
        Message {
            id: self.id,
            fields: self.fields.clone(),
            valid: self.valid,
            callback: self.callback.clone(),
            validator: self.validator.clone(),
            _observer: PhantomData,
        }
    }
}

impl<F: FieldList + fmt::Debug, O: Observer> fmt::Debug for Message<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("valid", &self.valid)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Messages compare equal when their field values do.
impl<F: FieldList + PartialEq, O: Observer> PartialEq for Message<F, O> {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}
