//! STX/ETX checksummed framing with a byte-driven, resynchronizing parser.
//!
//! Every frame on the wire is:
//! - a start marker (`0x02`)
//! - a one-byte payload length (1-255)
//! - the payload
//! - an 8-bit additive checksum of the payload
//! - an end marker (`0x03`)
//!
//! Decoding is one byte at a time through [`FrameParser`], which never
//! blocks, never buffers more than one maximum payload, and always falls
//! back to hunting for a fresh start marker after malformed input.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod parser;
pub mod reader;
#[cfg(feature = "async")]
pub mod tokio_codec;
pub mod writer;

pub use checksum::compute as compute_checksum;
pub use codec::{
    encode_capacity, encode_frame, encode_into, frame_len, validate_payload, Frame, FrameConfig,
    ACK, END, FRAME_OVERHEAD, MAX_PAYLOAD, NACK, START,
};
pub use error::{EncodeError, FrameError, Result};
pub use parser::{FrameParser, Outcome, ParserState, ParserStats, PAYLOAD_CAPACITY};
pub use reader::FrameReader;
#[cfg(feature = "async")]
pub use tokio_codec::AckwireCodec;
pub use writer::FrameWriter;
