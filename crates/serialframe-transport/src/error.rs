/// Errors that can occur on a byte source or sink.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying device channel.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device channel stopped accepting bytes.
    #[error("device channel closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
