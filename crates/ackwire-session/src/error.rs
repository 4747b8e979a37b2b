/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Caller misuse: empty or oversized payload.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The link configuration is unusable.
    #[error("invalid link configuration: {0}")]
    Config(String),

    /// The byte channel failed.
    #[error("transport error: {0}")]
    Transport(#[from] ackwire_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] ackwire_frame::FrameError),

    /// JSON configuration could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
