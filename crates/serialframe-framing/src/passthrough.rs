use std::thread;
use std::time::Duration;

use bytes::Bytes;
use serialframe_transport::ByteSource;

use crate::error::Result;
use crate::strategy::FramingStrategy;

/// How long to wait before polling an idle source again.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// No boundary detection: each attempt yields whatever the source has ready.
///
/// This is the degenerate fallback for transports that already deliver one
/// logical unit per read, or when boundaries do not matter. An idle source
/// makes the attempt sleep for the poll interval instead of busy-spinning.
#[derive(Debug)]
pub struct Passthrough {
    poll_interval: Duration,
}

impl Passthrough {
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the idle poll interval.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for Passthrough {
    fn default() -> Self {
        Self::new()
    }
}

impl FramingStrategy for Passthrough {
    fn frame_one(&mut self, source: &mut dyn ByteSource) -> Result<Option<Bytes>> {
        let chunk = source.read_available()?;
        if chunk.is_empty() {
            thread::sleep(self.poll_interval);
            return Ok(None);
        }
        Ok(Some(chunk))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::test_support::MemSource;

    #[test]
    fn yields_whatever_is_available() {
        let mut strategy = Passthrough::new();
        let mut source = MemSource::new(&b"raw bytes"[..]);

        let chunk = strategy.frame_one(&mut source).unwrap().unwrap();
        assert_eq!(chunk.as_ref(), b"raw bytes");
    }

    #[test]
    fn idle_source_sleeps_then_yields_nothing() {
        let mut strategy = Passthrough::with_poll_interval(Duration::from_millis(5));
        let mut source = MemSource::new(Vec::new());

        let started = Instant::now();
        assert_eq!(strategy.frame_one(&mut source).unwrap(), None);
        assert!(started.elapsed() >= Duration::from_millis(5));
    }
}
