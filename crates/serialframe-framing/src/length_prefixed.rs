use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use serialframe_transport::ByteSource;
use tracing::trace;

use crate::error::{FramingError, Result};
use crate::strategy::FramingStrategy;

/// Widest supported length field, in bytes.
pub const MAX_LENGTH_FIELD: usize = 8;

/// Default ceiling on a declared frame size: 16 MiB.
pub const DEFAULT_MAX_FRAME: usize = 16 * 1024 * 1024;

/// Wire byte order of the length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteOrder {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

/// Geometry of a protocol that embeds its payload length in each message.
///
/// For a `type (2) + len (2) + data + checksum (8)` protocol the length field
/// starts at offset 2, is 2 bytes wide, and the trailing overhead is
/// `2 + 2 + 8 = 12`: every non-data byte of the frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthPrefixedConfig {
    /// Byte order used to decode the length field.
    pub byte_order: ByteOrder,
    /// Width of the length field in bytes.
    pub length_field_size: usize,
    /// Index of the length field's first byte within the message.
    pub length_field_offset: usize,
    /// Total fixed non-data bytes per frame (headers, the length field
    /// itself, trailing checksums). Expected frame size is the decoded
    /// length plus this overhead.
    pub trailing_overhead: usize,
    /// Ceiling on the expected frame size; larger declarations abort the
    /// attempt instead of allocating.
    pub max_frame_size: usize,
}

impl Default for LengthPrefixedConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Big,
            length_field_size: 2,
            length_field_offset: 0,
            trailing_overhead: 0,
            max_frame_size: DEFAULT_MAX_FRAME,
        }
    }
}

/// Frames a protocol whose messages declare their own size.
///
/// Bytes accumulate until the length field has been captured and decoded;
/// from then on the attempt runs to the expected frame size. Overrunning the
/// expected size is a protocol violation: the attempt is discarded without
/// resynchronizing, so the next attempt may start mid-message. A corrupted
/// length field can therefore desynchronize subsequent framing.
#[derive(Debug)]
pub struct LengthPrefixed {
    order: ByteOrder,
    len_start: usize,
    len_end: usize,
    overhead: usize,
    max_frame_size: usize,
    field: [u8; MAX_LENGTH_FIELD],
    buf: BytesMut,
}

impl LengthPrefixed {
    /// Create a length-prefixed strategy from its field geometry.
    pub fn new(config: LengthPrefixedConfig) -> Result<Self> {
        if config.length_field_size == 0 {
            return Err(FramingError::EmptyLengthField);
        }
        if config.length_field_size > MAX_LENGTH_FIELD {
            return Err(FramingError::LengthFieldTooWide {
                size: config.length_field_size,
                max: MAX_LENGTH_FIELD,
            });
        }
        let field_end = config
            .length_field_offset
            .saturating_add(config.length_field_size);
        if field_end > config.max_frame_size {
            return Err(FramingError::LengthFieldOutOfRange {
                end: field_end,
                max: config.max_frame_size,
            });
        }

        Ok(Self {
            order: config.byte_order,
            len_start: config.length_field_offset,
            len_end: field_end - 1,
            overhead: config.trailing_overhead,
            max_frame_size: config.max_frame_size,
            field: [0u8; MAX_LENGTH_FIELD],
            buf: BytesMut::new(),
        })
    }
}

impl FramingStrategy for LengthPrefixed {
    fn frame_one(&mut self, source: &mut dyn ByteSource) -> Result<Option<Bytes>> {
        self.buf.clear();
        let mut expected: Option<usize> = None;

        while let Some(byte) = source.read_byte()? {
            let pos = self.buf.len();
            if pos >= self.len_start && pos <= self.len_end {
                self.field[pos - self.len_start] = byte;
                if pos == self.len_end {
                    let width = self.len_end - self.len_start + 1;
                    let declared = decode_length(&self.field[..width], self.order)
                        .saturating_add(self.overhead as u64);
                    if declared > self.max_frame_size as u64 {
                        return Err(FramingError::FrameTooLarge {
                            size: declared,
                            max: self.max_frame_size,
                        });
                    }
                    trace!(expected = declared, "length field decoded");
                    expected = Some(declared as usize);
                }
            }

            self.buf.put_u8(byte);

            if let Some(total) = expected {
                if self.buf.len() == total {
                    return Ok(Some(self.buf.split().freeze()));
                }
                if self.buf.len() > total {
                    return Err(FramingError::LengthOverrun {
                        expected: total,
                        read: self.buf.len(),
                    });
                }
            }
        }
        Ok(None)
    }
}

fn decode_length(field: &[u8], order: ByteOrder) -> u64 {
    match order {
        ByteOrder::Big => field.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        ByteOrder::Little => field
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
    }
}
