use std::io::{ErrorKind, Read, Write};

use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{ByteSink, ByteSource};

/// Adapts any blocking [`Read`] stream into a [`ByteSource`].
///
/// `read_available` always reports empty: plain `Read` streams cannot be
/// polled without blocking. Device channels that track availability should
/// implement [`ByteSource`] directly.
#[derive(Debug)]
pub struct StreamSource<T> {
    inner: T,
}

impl<T: Read + Send> StreamSource<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the adapter and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Send> ByteSource for StreamSource<T> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => {
                    debug!("byte source reached end-of-stream");
                    return Ok(None);
                }
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn read_available(&mut self) -> Result<Bytes> {
        Ok(Bytes::new())
    }
}

/// Adapts any blocking [`Write`] stream into a [`ByteSink`].
#[derive(Debug)]
pub struct StreamSink<T> {
    inner: T,
}

impl<T: Write + Send> StreamSink<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the adapter and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write + Send> ByteSink for StreamSink<T> {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < buf.len() {
            match self.inner.write(&buf[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}
