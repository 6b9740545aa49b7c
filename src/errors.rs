//! Error types for message decoding and encoding.
//!
//! The boolean entry points ([`crate::message::Message::decode`],
//! [`crate::field::Field::decode`]) are the primary API; these errors carry
//! the same outcome with enough detail to tell the failure kinds apart.

use thiserror::Error;

/// Why [`crate::message::Message::try_decode`] rejected a buffer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bits remain after the starting offset than the message declares.
    /// No field is touched.
    #[error("buffer too short: {available} bits available, {required} required")]
    BufferTooShort { available: usize, required: usize },

    /// A field's predicate rejected its decoded value. Decoding stopped at
    /// this field; later fields keep their previous values.
    #[error("field {field_id} rejected its decoded value")]
    FieldRejected { field_id: u32 },

    /// Every field decoded, but the whole-message validator rejected the
    /// combination.
    #[error("message {message_id} rejected by its validator")]
    MessageRejected { message_id: u32 },
}

/// Why [`crate::message::Message::encode_into`] could not write a message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The output slice cannot hold the encoded message.
    #[error("output buffer too short: {available} bytes available, {required} required")]
    BufferTooShort { available: usize, required: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = DecodeError::BufferTooShort {
            available: 12,
            required: 16,
        };
        assert_eq!(err.to_string(), "buffer too short: 12 bits available, 16 required");

        let err = DecodeError::FieldRejected { field_id: 7 };
        assert_eq!(err.to_string(), "field 7 rejected its decoded value");

        let err = EncodeError::BufferTooShort {
            available: 1,
            required: 2,
        };
        assert_eq!(
            err.to_string(),
            "output buffer too short: 1 bytes available, 2 required"
        );
    }
}
