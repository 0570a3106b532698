use bytes::{BufMut, Bytes, BytesMut};
use serialframe_transport::ByteSource;

use crate::error::{FramingError, Result};
use crate::strategy::FramingStrategy;

/// Frames a protocol where every message is exactly N bytes long.
///
/// End-of-stream before N bytes have accumulated yields no message; the
/// partial accumulation is discarded rather than delivered short.
#[derive(Debug)]
pub struct FixedLength {
    size: usize,
    buf: BytesMut,
}

impl FixedLength {
    /// Default frame size in bytes.
    pub const DEFAULT_SIZE: usize = 16;

    /// Create a fixed-length strategy for frames of `size` bytes.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(FramingError::ZeroFrameSize);
        }
        Ok(Self {
            size,
            buf: BytesMut::with_capacity(size),
        })
    }

    /// Configured frame size.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for FixedLength {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
            buf: BytesMut::with_capacity(Self::DEFAULT_SIZE),
        }
    }
}

impl FramingStrategy for FixedLength {
    fn frame_one(&mut self, source: &mut dyn ByteSource) -> Result<Option<Bytes>> {
        self.buf.clear();
        while self.buf.len() < self.size {
            match source.read_byte()? {
                Some(byte) => self.buf.put_u8(byte),
                None => return Ok(None),
            }
        }
        Ok(Some(self.buf.split().freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemSource;

    #[test]
    fn splits_stream_into_exact_frames() {
        let mut strategy = FixedLength::new(4).unwrap();
        let mut source = MemSource::new(vec![1u8, 2, 3, 4, 5, 6, 7, 8]);

        let first = strategy.frame_one(&mut source).unwrap().unwrap();
        let second = strategy.frame_one(&mut source).unwrap().unwrap();

        assert_eq!(first.as_ref(), &[1, 2, 3, 4]);
        assert_eq!(second.as_ref(), &[5, 6, 7, 8]);
        assert_eq!(strategy.frame_one(&mut source).unwrap(), None);
    }

    #[test]
    fn short_stream_yields_no_message() {
        let mut strategy = FixedLength::new(4).unwrap();
        let mut source = MemSource::new(vec![1u8, 2, 3]);

        assert_eq!(strategy.frame_one(&mut source).unwrap(), None);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn partial_bytes_never_leak_into_next_attempt() {
        let mut strategy = FixedLength::new(4).unwrap();

        let mut truncated = MemSource::new(vec![0xAAu8, 0xBB, 0xCC]);
        assert_eq!(strategy.frame_one(&mut truncated).unwrap(), None);

        let mut fresh = MemSource::new(vec![1u8, 2, 3, 4]);
        let frame = strategy.frame_one(&mut fresh).unwrap().unwrap();
        assert_eq!(frame.as_ref(), &[1, 2, 3, 4]);
    }

    #[test]
    fn zero_size_rejected_at_construction() {
        let err = FixedLength::new(0).unwrap_err();
        assert!(matches!(err, FramingError::ZeroFrameSize));
    }

    #[test]
    fn default_size_is_sixteen() {
        let mut strategy = FixedLength::default();
        assert_eq!(strategy.size(), 16);

        let mut source = MemSource::new(vec![0x55u8; 16]);
        let frame = strategy.frame_one(&mut source).unwrap().unwrap();
        assert_eq!(frame.len(), 16);
    }
}
