use std::fmt;

use bytes::Bytes;
use serialframe_transport::ByteSource;

use crate::error::Result;

/// Recovers one message boundary from an undelimited byte stream.
///
/// A strategy holds its configuration (fixed at construction) and a private
/// accumulation buffer. The buffer is reset at the start of every attempt:
/// no bytes ever carry over from a previous call, whether it completed,
/// failed, or hit end-of-stream.
pub trait FramingStrategy: Send + fmt::Debug {
    /// Run one framing attempt against the source.
    ///
    /// Returns `Ok(Some(message))` when a complete message was assembled and
    /// `Ok(None)` when the stream ended (or nothing was available) before a
    /// boundary was found. A zero-length message means "nothing framed this
    /// attempt" and is filtered by the caller before delivery.
    fn frame_one(&mut self, source: &mut dyn ByteSource) -> Result<Option<Bytes>>;
}
