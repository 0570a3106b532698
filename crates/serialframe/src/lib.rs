//! Message framing over serial byte streams.
//!
//! serialframe recovers discrete, application-level messages from the
//! undifferentiated byte stream a serial channel delivers — fixed-length,
//! delimited and length-prefixed protocols — and runs the read loop and
//! outbound path around them.
//!
//! # Crate Structure
//!
//! - [`transport`] — byte source/sink capabilities over the device channel
//! - [`framing`] — the framing strategies and their configuration
//! - [`port`] — channel lifecycle: read loop, submission, callbacks
//!   (behind the `port` feature, on by default)

/// Re-export transport types.
pub mod transport {
    pub use serialframe_transport::*;
}

/// Re-export framing types.
pub mod framing {
    pub use serialframe_framing::*;
}

/// Re-export port types (requires `port` feature).
#[cfg(feature = "port")]
pub mod port {
    pub use serialframe_port::*;
}
