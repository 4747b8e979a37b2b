//! Framed, checksummed, acknowledged byte links.
//!
//! ackwire moves small payloads (1-255 bytes) across an unreliable byte
//! channel. Each payload travels in an STX/ETX frame with an additive
//! checksum; the receiver answers every frame with ACK or NACK and the
//! transmitter retransmits on NACK or timeout up to a bounded number of
//! attempts.
//!
//! # Crate Structure
//!
//! - [`transport`]: channel and clock contracts, in-memory and stream channels
//! - [`frame`]: frame codec, byte-driven parser, blocking reader/writer
//! - [`session`]: transmitter and receiver tasks, scheduler, [`Link`](session::Link)
//!
//! # Example
//!
//! ```
//! use ackwire::session::{Link, TransmitResult};
//! use ackwire::transport::{ManualClock, MemoryChannel};
//!
//! let mut link = Link::new(MemoryChannel::new(), ManualClock::new());
//! link.send(&b"hello"[..]).unwrap();
//!
//! let result = link.run_until_complete(100, 10).unwrap();
//! assert_eq!(result, Some(TransmitResult::Success));
//! assert_eq!(link.received_payload(), b"hello");
//! ```

/// Re-export transport types.
pub mod transport {
    pub use ackwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ackwire_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use ackwire_session::*;
}
