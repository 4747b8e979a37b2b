//! Byte channel and clock contracts for the ackwire link layer.
//!
//! The reliability layer never touches a wire directly. It talks to:
//! - a [`ByteChannel`] carrying frame bytes one way and single
//!   acknowledgment bytes the other way
//! - a [`Clock`] reporting logical milliseconds
//!
//! This is the lowest layer of ackwire. Two channels ship here: the
//! fault-injecting [`MemoryChannel`] used for simulation and tests, and
//! [`StreamChannel`], which adapts any non-blocking `Read + Write` stream.

pub mod clock;
pub mod error;
pub mod memory;
pub mod stream;
pub mod traits;

pub use clock::{ManualClock, MonotonicClock};
pub use error::{Result, TransportError};
pub use memory::{ChannelStats, MemoryChannel};
pub use stream::StreamChannel;
pub use traits::{ByteChannel, Clock};
