use bytes::Bytes;

use crate::error::Result;

/// Blocking byte-level read capability over a device channel.
///
/// Exactly one thread may read from a source at a time. The device channel
/// that backs it (serial port, socket, pipe) is opened and configured by the
/// caller; this trait only sees the resulting byte stream.
pub trait ByteSource: Send {
    /// Read a single byte, blocking until one arrives.
    ///
    /// Returns `Ok(None)` on end-of-stream.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Read whatever is immediately available without blocking.
    ///
    /// Sources that cannot report availability return an empty buffer; an
    /// empty buffer never distinguishes "no data yet" from "stream closed".
    fn read_available(&mut self) -> Result<Bytes>;
}

/// Blocking byte-level write capability over a device channel.
///
/// A sink may be shared by several writers as long as each call hands over a
/// complete message; implementations must not split a single `write_all`.
pub trait ByteSink: Send {
    /// Write the entire buffer, blocking until the device accepts it.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Flush any transport-level buffering.
    fn flush(&mut self) -> Result<()>;
}

impl ByteSource for Box<dyn ByteSource> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        self.as_mut().read_byte()
    }

    fn read_available(&mut self) -> Result<Bytes> {
        self.as_mut().read_available()
    }
}

impl ByteSink for Box<dyn ByteSink> {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.as_mut().write_all(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.as_mut().flush()
    }
}
