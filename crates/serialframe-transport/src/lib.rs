//! Byte-level transport capabilities for serial framing.
//!
//! A device channel (serial port, pipe, socket) is opened and configured by
//! the embedding application; this crate only models the two capabilities the
//! framing layers need: a blocking [`ByteSource`] and a blocking [`ByteSink`].
//! [`StreamSource`] and [`StreamSink`] adapt any `std::io` stream.

pub mod error;
pub mod stream;
pub mod traits;

pub use error::{Result, TransportError};
pub use stream::{StreamSink, StreamSource};
pub use traits::{ByteSink, ByteSource};
