use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use serialframe_framing::{FramingStrategy, Passthrough};
use serialframe_transport::{ByteSink, ByteSource};
use tracing::{debug, warn};

use crate::error::{PortError, Result};

/// Callback receiving each completely framed inbound message.
pub type MessageHandler = Box<dyn FnMut(Bytes) + Send + 'static>;

/// Callback invoked after the framing loop has been started.
pub type ConnectHandler = Box<dyn FnMut() + Send + 'static>;

type LoopParts<R> = (R, Box<dyn FramingStrategy>, Option<MessageHandler>);

/// A serial channel with message framing on the inbound path and
/// fire-and-forget submission on the outbound path.
///
/// While connected, one dedicated thread pulls bytes from the source,
/// applies the framing strategy and delivers completed messages to the
/// message handler in strict arrival order. Each `submit` runs on its own
/// short-lived thread; concurrent submissions may interleave with each
/// other in any order, but never byte-wise within one message.
///
/// Cancellation is observed between framing attempts only. A read that is
/// already blocked stays blocked until the device channel itself is closed,
/// which is the caller's responsibility and makes the read return
/// end-of-stream or an error.
pub struct FramedPort<R, W> {
    source: Option<R>,
    sink: Arc<Mutex<W>>,
    strategy: Option<Box<dyn FramingStrategy>>,
    on_message: Option<MessageHandler>,
    on_connected: Option<ConnectHandler>,
    cancelled: Arc<AtomicBool>,
    reader: Option<JoinHandle<LoopParts<R>>>,
}

impl<R, W> FramedPort<R, W>
where
    R: ByteSource + 'static,
    W: ByteSink + 'static,
{
    /// Create a disconnected port over a source/sink pair.
    ///
    /// The default strategy is [`Passthrough`]; override it with
    /// [`with_strategy`](Self::with_strategy) before connecting.
    pub fn new(source: R, sink: W) -> Self {
        Self {
            source: Some(source),
            sink: Arc::new(Mutex::new(sink)),
            strategy: Some(Box::new(Passthrough::new())),
            on_message: None,
            on_connected: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            reader: None,
        }
    }

    /// Select the framing strategy used by subsequent connections.
    ///
    /// The strategy instance is reused across reconnects for the lifetime
    /// of the port.
    pub fn with_strategy(mut self, strategy: Box<dyn FramingStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Register the inbound message callback.
    pub fn on_message(mut self, handler: impl FnMut(Bytes) + Send + 'static) -> Self {
        self.on_message = Some(Box::new(handler));
        self
    }

    /// Register a callback invoked every time the port connects.
    pub fn on_connected(mut self, handler: impl FnMut() + Send + 'static) -> Self {
        self.on_connected = Some(Box::new(handler));
        self
    }

    /// Whether the framing loop is currently running.
    pub fn is_connected(&self) -> bool {
        self.reader.is_some()
    }

    /// Start the framing loop on a dedicated thread.
    pub fn connect(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Err(PortError::AlreadyConnected);
        }
        let source = self.source.take().ok_or(PortError::LoopPanicked)?;
        let strategy = self.strategy.take().ok_or(PortError::LoopPanicked)?;
        let on_message = self.on_message.take();

        self.cancelled.store(false, Ordering::Release);
        let cancelled = Arc::clone(&self.cancelled);
        let handle = thread::Builder::new()
            .name("serialframe-read".into())
            .spawn(move || run_framing_loop(source, strategy, on_message, cancelled))?;
        self.reader = Some(handle);

        if let Some(callback) = self.on_connected.as_mut() {
            callback();
        }
        Ok(())
    }

    /// Stop the framing loop and wait for it to exit.
    ///
    /// Idempotent. The source, strategy and message handler are recovered
    /// from the loop thread so the port can reconnect.
    pub fn disconnect(&mut self) -> Result<()> {
        self.cancelled.store(true, Ordering::Release);
        let Some(handle) = self.reader.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok((source, strategy, on_message)) => {
                self.source = Some(source);
                self.strategy = Some(strategy);
                self.on_message = on_message;
                Ok(())
            }
            Err(_) => Err(PortError::LoopPanicked),
        }
    }

    /// Queue a message for transmission and return immediately.
    ///
    /// The write happens on its own thread; a failure is logged and not
    /// surfaced. Callers needing delivery confirmation must layer their own
    /// acknowledgement protocol on top. Submissions made after the port was
    /// cancelled are dropped.
    pub fn submit(&self, message: impl Into<Bytes>) {
        let message = message.into();
        let sink = Arc::clone(&self.sink);
        let cancelled = Arc::clone(&self.cancelled);
        let spawned = thread::Builder::new()
            .name("serialframe-write".into())
            .spawn(move || {
                if cancelled.load(Ordering::Acquire) {
                    debug!(len = message.len(), "dropping submission on cancelled port");
                    return;
                }
                let mut sink = match sink.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if let Err(err) = sink.write_all(&message).and_then(|()| sink.flush()) {
                    warn!(error = %err, len = message.len(), "outbound write failed");
                }
            });
        if let Err(err) = spawned {
            warn!(error = %err, "failed to spawn outbound writer");
        }
    }
}

impl<R, W> Drop for FramedPort<R, W> {
    fn drop(&mut self) {
        // The loop thread is detached here; it exits at its next attempt
        // boundary once the device channel stops producing.
        self.cancelled.store(true, Ordering::Release);
    }
}

fn run_framing_loop<R: ByteSource>(
    mut source: R,
    mut strategy: Box<dyn FramingStrategy>,
    mut on_message: Option<MessageHandler>,
    cancelled: Arc<AtomicBool>,
) -> LoopParts<R> {
    debug!("framing loop started");
    while !cancelled.load(Ordering::Acquire) {
        match strategy.frame_one(&mut source) {
            Ok(Some(message)) if !message.is_empty() => {
                if let Some(handler) = on_message.as_mut() {
                    handler(message);
                }
            }
            // End-of-stream and empty results are indistinguishable from
            // "no data yet"; keep polling until cancelled.
            Ok(_) => {}
            Err(err) => warn!(error = %err, "framing attempt failed"),
        }
    }
    debug!("framing loop stopped");
    (source, strategy, on_message)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Duration;

    use serialframe_framing::Delimited;
    use serialframe_transport::Result as TransportResult;

    use super::*;

    /// Pre-scripted byte source: yields its bytes then end-of-stream.
    struct ScriptedSource {
        data: Vec<u8>,
        pos: usize,
    }

    impl ScriptedSource {
        fn new(data: impl Into<Vec<u8>>) -> Self {
            Self {
                data: data.into(),
                pos: 0,
            }
        }
    }

    impl ByteSource for ScriptedSource {
        fn read_byte(&mut self) -> TransportResult<Option<u8>> {
            if self.pos >= self.data.len() {
                return Ok(None);
            }
            let byte = self.data[self.pos];
            self.pos += 1;
            Ok(Some(byte))
        }

        fn read_available(&mut self) -> TransportResult<Bytes> {
            let chunk = Bytes::copy_from_slice(&self.data[self.pos..]);
            self.pos = self.data.len();
            Ok(chunk)
        }
    }

    /// Sink collecting everything written into shared memory.
    #[derive(Clone, Default)]
    struct SharedSink {
        data: Arc<Mutex<Vec<u8>>>,
    }

    impl ByteSink for SharedSink {
        fn write_all(&mut self, buf: &[u8]) -> TransportResult<()> {
            self.data.lock().unwrap().extend_from_slice(buf);
            Ok(())
        }

        fn flush(&mut self) -> TransportResult<()> {
            Ok(())
        }
    }

    /// Byte source that counts every read issued against it.
    struct CountingSource {
        reads: Arc<AtomicUsize>,
    }

    impl ByteSource for CountingSource {
        fn read_byte(&mut self) -> TransportResult<Option<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        fn read_available(&mut self) -> TransportResult<Bytes> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::new())
        }
    }

    fn delimited() -> Box<dyn FramingStrategy> {
        Box::new(Delimited::new(&b"^"[..], &b"$"[..]).unwrap())
    }

    #[test]
    fn delivers_framed_messages_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut port = FramedPort::new(ScriptedSource::new(&b"^AB$^CD$^EF$"[..]), SharedSink::default())
            .with_strategy(delimited())
            .on_message(move |message| {
                let _ = tx.send(message);
            });

        port.connect().unwrap();

        for expected in [&b"AB"[..], b"CD", b"EF"] {
            let message = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(message.as_ref(), expected);
        }

        port.disconnect().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn zero_length_messages_are_filtered() {
        let (tx, rx) = mpsc::channel();
        // Shared-marker wrapping produces a zero-length span before the
        // opening marker; only the payload may reach the handler.
        let mut port = FramedPort::new(ScriptedSource::new(&b"#AB#"[..]), SharedSink::default())
            .with_strategy(Box::new(Delimited::new(&b""[..], &b"#"[..]).unwrap()))
            .on_message(move |message| {
                let _ = tx.send(message);
            });

        port.connect().unwrap();
        let message = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        port.disconnect().unwrap();

        assert_eq!(message.as_ref(), b"AB");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn connect_twice_is_rejected() {
        let mut port = FramedPort::new(ScriptedSource::new(Vec::new()), SharedSink::default());
        port.connect().unwrap();
        assert!(matches!(port.connect(), Err(PortError::AlreadyConnected)));
        port.disconnect().unwrap();
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut port = FramedPort::new(ScriptedSource::new(Vec::new()), SharedSink::default());
        port.disconnect().unwrap();
        port.connect().unwrap();
        port.disconnect().unwrap();
        port.disconnect().unwrap();
        assert!(!port.is_connected());
    }

    #[test]
    fn reconnect_reuses_strategy_and_fires_callback() {
        let connects = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(AtomicUsize::new(0));

        let connects_cb = Arc::clone(&connects);
        let seen_cb = Arc::clone(&seen);
        let mut port = FramedPort::new(ScriptedSource::new(&b"^AB$"[..]), SharedSink::default())
            .with_strategy(delimited())
            .on_connected(move || {
                connects_cb.fetch_add(1, Ordering::SeqCst);
            })
            .on_message(move |_| {
                seen_cb.fetch_add(1, Ordering::SeqCst);
            });

        port.connect().unwrap();
        while seen.load(Ordering::SeqCst) == 0 {
            thread::yield_now();
        }
        port.disconnect().unwrap();

        port.connect().unwrap();
        port.disconnect().unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 2);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn submit_writes_whole_message() {
        let sink = SharedSink::default();
        let written = Arc::clone(&sink.data);
        let port = FramedPort::new(ScriptedSource::new(Vec::new()), sink);

        port.submit(Bytes::from_static(b"^hello$"));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            if written.lock().unwrap().as_slice() == b"^hello$" {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "submission never landed");
            thread::yield_now();
        }
    }

    #[test]
    fn concurrent_submissions_never_interleave() {
        let sink = SharedSink::default();
        let written = Arc::clone(&sink.data);
        let port = FramedPort::new(ScriptedSource::new(Vec::new()), sink);

        const LEN: usize = 1024;
        let letters = *b"abcdefgh";
        for letter in letters {
            port.submit(vec![letter; LEN]);
        }

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while written.lock().unwrap().len() < letters.len() * LEN {
            assert!(std::time::Instant::now() < deadline, "submissions never landed");
            thread::yield_now();
        }

        let data = written.lock().unwrap().clone();
        let mut runs = Vec::new();
        for &byte in &data {
            match runs.last_mut() {
                Some((last, count)) if *last == byte => *count += 1,
                _ => runs.push((byte, 1usize)),
            }
        }

        assert_eq!(runs.len(), letters.len());
        let mut seen: Vec<u8> = runs.iter().map(|(byte, _)| *byte).collect();
        seen.sort_unstable();
        assert_eq!(seen, letters);
        assert!(runs.iter().all(|(_, count)| *count == LEN));
    }

    #[test]
    fn no_framing_attempts_after_disconnect() {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            reads: Arc::clone(&reads),
        };
        let mut port = FramedPort::new(source, SharedSink::default()).with_strategy(delimited());

        port.connect().unwrap();
        while reads.load(Ordering::SeqCst) == 0 {
            thread::yield_now();
        }
        port.disconnect().unwrap();

        // Disconnect joins the loop thread; the source must never be read
        // again until the port reconnects.
        let after_join = reads.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(reads.load(Ordering::SeqCst), after_join);
    }

    #[test]
    fn submissions_after_disconnect_are_dropped() {
        let sink = SharedSink::default();
        let written = Arc::clone(&sink.data);
        let mut port = FramedPort::new(ScriptedSource::new(Vec::new()), sink);

        port.connect().unwrap();
        port.disconnect().unwrap();
        port.submit(Bytes::from_static(b"late"));

        thread::sleep(Duration::from_millis(50));
        assert!(written.lock().unwrap().is_empty());
    }
}
