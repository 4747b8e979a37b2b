/// Reasons a payload cannot be encoded into a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The payload is empty or longer than the length field allows.
    #[error("invalid payload length ({len} bytes, allowed 1..={max})")]
    InvalidLength { len: usize, max: usize },

    /// The caller-supplied output buffer cannot hold the frame.
    #[error("output buffer too small ({needed} bytes needed, {available} available)")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Errors that can occur while reading or writing frames on a stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload could not be encoded.
    #[error("frame encode error: {0}")]
    Encode(#[from] EncodeError),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before another valid frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
