//! # bitmsg
//!
//! A bit-granular codec for fixed-layout binary messages.
//!
//! A message is an ordered list of fields, each a bit range of up to 32 bits
//! that need not be byte aligned. Decoding walks the fields with a running
//! bit cursor, validates every value against its field's predicate and stops
//! at the first rejection. Encoding packs the values back into bytes.
//!
//! Layouts are declared with types: each field has a [`FieldSpec`] marker,
//! the list of fields is a compile-time [`list::Cons`] chain, and fields are
//! looked up by their marker type.
//!
//! ## Example
//!
//! A CAN-style extended header: 3-bit priority, 18-bit parameter group and
//! 8-bit source address.
//!
//! ```
//! use bitmsg::{Field, Fields, Message, field_spec, fields};
//!
//! field_spec!(Priority: u8 [3], id = 1);
//! field_spec!(Group: u32 [18], id = 2);
//! field_spec!(Source: u8 [8], id = 3);
//!
//! let mut header: Message<Fields![Priority, Group, Source]> = Message::new(
//!     0x18u32,
//!     fields![
//!         Field::less_equal_to(6),
//!         Field::any(),
//!         Field::not_equal_to(0xFF),
//!     ],
//! );
//!
//! header.get_mut::<Priority, _>().set(3);
//! header.get_mut::<Group, _>().set(0xFEF1);
//! header.get_mut::<Source, _>().set(0x21);
//! let bytes = header.encode();
//! assert_eq!(bytes.len(), 4);
//!
//! let mut decoded = header.clone();
//! assert!(decoded.decode(&bytes, 0));
//! assert_eq!(decoded.value_of::<Group, _>(), 0xFEF1);
//! assert_eq!(decoded.value_of::<Source, _>(), 0x21);
//! ```

pub mod bits;
pub mod errors;
pub mod field;
pub mod list;
pub mod message;
pub mod observer;
#[cfg(feature = "serde")]
pub mod serde;
pub mod value;

pub use bits::BitOrder;
pub use errors::{DecodeError, EncodeError};
pub use field::{Field, FieldSpec};
pub use list::{Cons, FieldList, Nil};
pub use message::Message;
#[cfg(feature = "tracing")]
pub use observer::TracingObserver;
pub use observer::{NoopObserver, Observer};
pub use value::BitValue;
