//! Message-boundary recovery for undelimited serial byte streams.
//!
//! Serial transports deliver an unstructured byte sequence with no inherent
//! message boundaries. A [`FramingStrategy`] reconstructs them: each call
//! consumes bytes from a [`serialframe_transport::ByteSource`] and yields at
//! most one complete message, tolerating partial reads and resetting its
//! accumulation state between attempts.
//!
//! Four strategies are provided:
//! - [`FixedLength`] — every message is exactly N bytes
//! - [`Delimited`] — messages wrapped in head/tail marker sequences
//! - [`LengthPrefixed`] — messages declare their own size in an embedded field
//! - [`Passthrough`] — no boundary detection, deliver reads as-is

pub mod config;
pub mod delimited;
pub mod error;
pub mod fixed;
pub mod length_prefixed;
pub mod passthrough;
pub mod strategy;

#[cfg(test)]
mod test_support;

pub use config::StrategyConfig;
pub use delimited::Delimited;
pub use error::{FramingError, Result};
pub use fixed::FixedLength;
pub use length_prefixed::{
    ByteOrder, LengthPrefixed, LengthPrefixedConfig, DEFAULT_MAX_FRAME, MAX_LENGTH_FIELD,
};
pub use passthrough::{Passthrough, DEFAULT_POLL_INTERVAL};
pub use strategy::FramingStrategy;
