use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum;
use crate::error::EncodeError;

/// Start-of-frame marker.
pub const START: u8 = 0x02;

/// End-of-frame marker.
pub const END: u8 = 0x03;

/// Positive acknowledgment byte.
pub const ACK: u8 = 0x06;

/// Negative acknowledgment byte.
pub const NACK: u8 = 0x15;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = 255;

/// Bytes a frame adds around its payload: start + length + checksum + end.
pub const FRAME_OVERHEAD: usize = 4;

/// A validated, received frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame payload (1-255 bytes).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The checksum this frame carries on the wire.
    pub fn checksum(&self) -> u8 {
        checksum::compute(&self.payload)
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        frame_len(self.payload.len())
    }
}

/// Wire size of a frame carrying `payload_len` bytes.
pub const fn frame_len(payload_len: usize) -> usize {
    FRAME_OVERHEAD + payload_len
}

/// Buffer capacity [`encode_frame`] requires for `payload_len` bytes.
///
/// One byte more than the frame itself: a destination must hold
/// `5 + len` bytes even though only `4 + len` are written.
pub const fn encode_capacity(payload_len: usize) -> usize {
    frame_len(payload_len) + 1
}

/// Check that a payload fits a frame limited to `max_payload` bytes.
pub fn validate_payload(payload: &[u8], max_payload: usize) -> Result<(), EncodeError> {
    let max = max_payload.min(MAX_PAYLOAD);
    if payload.is_empty() || payload.len() > max {
        return Err(EncodeError::InvalidLength {
            len: payload.len(),
            max,
        });
    }
    Ok(())
}

/// Encode a payload into a caller-supplied buffer.
///
/// Wire format:
/// ```text
/// ┌────────┬────────┬──────────────┬──────────┬────────┐
/// │ START  │ LEN    │ PAYLOAD      │ CHECKSUM │ END    │
/// │ 0x02   │ 1-255  │ (LEN bytes)  │ sum mod  │ 0x03   │
/// │        │        │              │ 256      │        │
/// └────────┴────────┴──────────────┴──────────┴────────┘
/// ```
///
/// `dst` must hold at least [`encode_capacity`] bytes. Returns the number
/// of bytes written, [`frame_len`] of the payload. Nothing is written on
/// failure.
pub fn encode_frame(payload: &[u8], dst: &mut [u8]) -> Result<usize, EncodeError> {
    validate_payload(payload, MAX_PAYLOAD)?;

    let needed = encode_capacity(payload.len());
    if dst.len() < needed {
        return Err(EncodeError::BufferTooSmall {
            needed,
            available: dst.len(),
        });
    }

    let len = payload.len();
    dst[0] = START;
    dst[1] = len as u8;
    dst[2..2 + len].copy_from_slice(payload);
    dst[2 + len] = checksum::compute(payload);
    dst[3 + len] = END;

    Ok(frame_len(len))
}

/// Encode a payload, appending the frame to `dst`.
pub fn encode_into(payload: &[u8], dst: &mut BytesMut) -> Result<usize, EncodeError> {
    validate_payload(payload, MAX_PAYLOAD)?;

    let needed = frame_len(payload.len());
    dst.reserve(needed);
    dst.put_u8(START);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    dst.put_u8(checksum::compute(payload));
    dst.put_u8(END);
    Ok(needed)
}

/// Configuration shared by the parser, reader, writer and codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum payload size in bytes, within 1..=255. Default: 255.
    pub max_payload_size: usize,
}

impl FrameConfig {
    /// Configuration with a lowered payload limit, clamped to 1..=255.
    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self {
            max_payload_size: max_payload_size.clamp(1, MAX_PAYLOAD),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
        }
    }
}
