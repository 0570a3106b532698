//! Framed serial channel lifecycle.
//!
//! [`FramedPort`] ties a byte source, a byte sink and a framing strategy
//! together: `connect` starts a dedicated read loop that delivers framed
//! messages to a callback, `submit` queues outbound messages without
//! blocking the caller, `disconnect` cancels the loop at its next attempt
//! boundary.

pub mod error;
pub mod port;

pub use error::{PortError, Result};
pub use port::{ConnectHandler, FramedPort, MessageHandler};
