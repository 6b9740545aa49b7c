//! Diagnostic hooks invoked while a message decodes.
//!
//! An [`Observer`] is chosen by type when a message is declared and its hooks
//! are plain associated functions, so the default [`NoopObserver`] compiles
//! away entirely.

/// Hook points of [`crate::message::Message::try_decode`] and
/// [`crate::message::Message::is_valid`].
///
/// Every hook receives the id of the message being processed. The defaults do
/// nothing.
pub trait Observer {
    /// Decoding of a message begins.
    fn decode_start(_message_id: u32) {}

    /// All fields were visited, either to the end or up to the first failure.
    /// Not called when the buffer is too short.
    fn decode_end(_message_id: u32) {}

    /// The buffer supplies `available` bits after the offset but the message
    /// declares `required`.
    fn buffer_too_short(_message_id: u32, _available: usize, _required: usize) {}

    /// A field decoded and accepted its value.
    fn field_decoded(_message_id: u32, _field_id: u32) {}

    /// A field rejected its decoded value; decoding stops here.
    fn field_decode_failed(_message_id: u32, _field_id: u32) {}

    /// [`crate::message::Message::is_valid`] found this field invalid.
    fn field_invalid(_message_id: u32, _field_id: u32) {}
}

/// Observer that ignores every hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Observer that reports every hook as a `tracing` event.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingObserver;

#[cfg(feature = "tracing")]
impl Observer for TracingObserver {
    fn decode_start(message_id: u32) {
        tracing::debug!(message_id, "decode started");
    }

    fn decode_end(message_id: u32) {
        tracing::debug!(message_id, "decode finished");
    }

    fn buffer_too_short(message_id: u32, available: usize, required: usize) {
        tracing::warn!(message_id, available, required, "buffer too short");
    }

    fn field_decoded(message_id: u32, field_id: u32) {
        tracing::trace!(message_id, field_id, "field decoded");
    }

    fn field_decode_failed(message_id: u32, field_id: u32) {
        tracing::warn!(message_id, field_id, "field rejected decoded value");
    }

    fn field_invalid(message_id: u32, field_id: u32) {
        tracing::debug!(message_id, field_id, "field invalid");
    }
}
