use bytes::Bytes;
use serialframe_transport::{ByteSource, Result};

/// In-memory byte source with full availability reporting.
pub struct MemSource {
    data: Vec<u8>,
    pos: usize,
}

impl MemSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for MemSource {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    fn read_available(&mut self) -> Result<Bytes> {
        let chunk = Bytes::copy_from_slice(&self.data[self.pos..]);
        self.pos = self.data.len();
        Ok(chunk)
    }
}
