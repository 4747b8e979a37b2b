//! Stop-and-wait reliability layer on top of ackwire framing.
//!
//! Two resumable tasks share one [`ByteChannel`](ackwire_transport::ByteChannel):
//! - [`Transmitter`] sends one frame, waits for an acknowledgment or a
//!   timeout, and retransmits up to a bounded number of attempts
//! - [`Receiver`] decodes incoming bytes, acknowledges every completed
//!   frame, and records the last accepted payload
//!
//! Neither task blocks or spawns threads. Each call to `step` runs until
//! the task has to wait, then returns; the [`Scheduler`] advances both tasks
//! once per tick, transmitter first. [`Link`] bundles channel, clock,
//! tasks and scheduler behind a polled API.

pub mod config;
pub mod error;
pub mod link;
pub mod receiver;
pub mod scheduler;
pub mod task;
pub mod timer;
pub mod transmitter;

pub use config::LinkConfig;
pub use error::{Result, SessionError};
pub use link::Link;
pub use receiver::{ReceiveResult, Receiver, ReceiverStats};
pub use scheduler::{Scheduler, TickReport};
pub use task::TaskStatus;
pub use timer::Timer;
pub use transmitter::{TransmitResult, Transmitter, TxPhase};
