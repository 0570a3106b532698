use bytes::Bytes;
use serialframe_transport::ByteSource;

use crate::error::{FramingError, Result};
use crate::strategy::FramingStrategy;

/// Frames a protocol that wraps each message in marker byte sequences.
///
/// With both a head and a tail marker configured, a message is the span
/// between a head occurrence and the next tail occurrence, markers excluded;
/// bytes before the head are discarded. With only one marker configured it is
/// shared by both ends: each attempt yields the bytes accumulated up to the
/// next marker occurrence, so an `M data M` stream delivers `data` once the
/// zero-length span before the opening marker is filtered out.
///
/// Markers are matched greedily against the buffer suffix after every byte;
/// a marker sequence occurring inside payload data ends the frame early, so
/// payloads must not contain the configured markers.
#[derive(Debug)]
pub struct Delimited {
    head: Bytes,
    tail: Bytes,
    buf: Vec<u8>,
}

impl Delimited {
    /// Create a delimited strategy.
    ///
    /// Either marker may be empty, but not both.
    pub fn new(head: impl Into<Bytes>, tail: impl Into<Bytes>) -> Result<Self> {
        let head = head.into();
        let tail = tail.into();
        if head.is_empty() && tail.is_empty() {
            return Err(FramingError::EmptyMarkers);
        }
        Ok(Self {
            head,
            tail,
            buf: Vec::new(),
        })
    }

    fn frame_between_markers(&mut self, source: &mut dyn ByteSource) -> Result<Option<Bytes>> {
        let mut start: Option<usize> = None;
        while let Some(byte) = source.read_byte()? {
            self.buf.push(byte);
            match start {
                None => {
                    if ends_with(&self.buf, &self.head) {
                        start = Some(self.buf.len());
                    }
                }
                // The tail only closes the frame once it lies entirely
                // after the recorded start.
                Some(from) => {
                    if ends_with(&self.buf, &self.tail) && from + self.tail.len() <= self.buf.len()
                    {
                        let end = self.buf.len() - self.tail.len();
                        return Ok(Some(Bytes::copy_from_slice(&self.buf[from..end])));
                    }
                }
            }
        }
        Ok(None)
    }

    fn frame_until_marker(&mut self, source: &mut dyn ByteSource) -> Result<Option<Bytes>> {
        let marker = if self.head.is_empty() {
            self.tail.clone()
        } else {
            self.head.clone()
        };
        while let Some(byte) = source.read_byte()? {
            self.buf.push(byte);
            if ends_with(&self.buf, &marker) {
                let end = self.buf.len() - marker.len();
                return Ok(Some(Bytes::copy_from_slice(&self.buf[..end])));
            }
        }
        Ok(None)
    }
}

impl FramingStrategy for Delimited {
    fn frame_one(&mut self, source: &mut dyn ByteSource) -> Result<Option<Bytes>> {
        self.buf.clear();
        if self.head.is_empty() || self.tail.is_empty() {
            self.frame_until_marker(source)
        } else {
            self.frame_between_markers(source)
        }
    }
}

/// Suffix match; an empty marker never matches.
fn ends_with(buf: &[u8], marker: &[u8]) -> bool {
    !marker.is_empty() && buf.len() >= marker.len() && buf[buf.len() - marker.len()..] == *marker
}
