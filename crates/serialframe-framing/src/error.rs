use serialframe_transport::TransportError;

/// Errors that can occur while configuring or running a framing strategy.
///
/// Configuration problems are reported at construction and never at runtime;
/// the remaining variants abort a single framing attempt.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    /// Fixed-length framing needs a frame size of at least one byte.
    #[error("fixed frame size must be greater than zero")]
    ZeroFrameSize,

    /// Delimited framing needs at least one non-empty marker.
    #[error("head and tail markers are both empty")]
    EmptyMarkers,

    /// The length field must span at least one byte.
    #[error("length field is empty (its end index precedes its start)")]
    EmptyLengthField,

    /// The length field is wider than the largest decodable integer.
    #[error("length field too wide ({size} bytes, max {max})")]
    LengthFieldTooWide { size: usize, max: usize },

    /// The length field does not fit inside the largest allowed frame.
    #[error("length field ends at byte {end}, beyond the maximum frame size {max}")]
    LengthFieldOutOfRange { end: usize, max: usize },

    /// The declared frame size exceeds the configured maximum.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: u64, max: usize },

    /// More bytes accumulated than the declared frame size allows.
    ///
    /// The attempt is discarded without resynchronizing; the next attempt
    /// starts at the stream's current position, which may be mid-message.
    #[error("frame overran its declared size (expected {expected}, read {read})")]
    LengthOverrun { expected: usize, read: usize },

    /// The byte source or sink failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FramingError>;
