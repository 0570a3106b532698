/// Errors that can occur managing a framed port's lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// `connect` was called while the framing loop is already running.
    #[error("port is already connected")]
    AlreadyConnected,

    /// The framing loop thread could not be spawned.
    #[error("failed to spawn framing loop: {0}")]
    Spawn(#[from] std::io::Error),

    /// The framing loop thread panicked; its source and strategy are lost
    /// and the port cannot reconnect.
    #[error("framing loop panicked")]
    LoopPanicked,
}

pub type Result<T> = std::result::Result<T, PortError>;
