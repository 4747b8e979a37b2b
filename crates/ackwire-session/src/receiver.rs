//! Receive side of the stop-and-wait link.
//!
//! The receiver runs an endless sequence of acquisitions. Each acquisition
//! resets the parser, pulls bytes until the parser reports a terminal
//! outcome, and answers it:
//!
//! | Outcome           | Reply | Recorded              | Then                   |
//! |-------------------|-------|-----------------------|------------------------|
//! | `FrameReady`      | ACK   | payload, `Success`    | yield                  |
//! | `ChecksumInvalid` | NACK  | `ChecksumInvalid`     | yield                  |
//! | `LengthInvalid`   | NACK  | `LengthInvalid`       | next acquisition, same step |
//!
//! Yielding after each completed frame means at most one frame completes
//! per step. The received flag and payload belong to the latest
//! acquisition: they are cleared as soon as the next start marker is
//! consumed, so a rejected frame never leaves an earlier message flagged.

use ackwire_frame::{FrameParser, Outcome, ParserState, ACK, NACK};
use ackwire_transport::ByteChannel;
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::error::Result;
use crate::task::TaskStatus;

/// Result of the most recently completed acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveResult {
    Success,
    ChecksumInvalid,
    LengthInvalid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    pub frames_accepted: u64,
    pub frames_rejected: u64,
    pub acks_sent: u64,
    pub nacks_sent: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxResume {
    /// Start a fresh acquisition.
    Acquire,
    /// Mid-acquisition, waiting for the next byte.
    Pull,
}

/// Resumable receiver task.
#[derive(Debug, Clone)]
pub struct Receiver {
    parser: FrameParser,
    resume: RxResume,
    message_received: bool,
    result: Option<ReceiveResult>,
    payload: Bytes,
    stats: ReceiverStats,
}

impl Receiver {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            parser: FrameParser::with_config(&config.frame_config()),
            resume: RxResume::Acquire,
            message_received: false,
            result: None,
            payload: Bytes::new(),
            stats: ReceiverStats::default(),
        }
    }

    /// Advance the receiver until it runs out of bytes or completes a frame.
    pub fn step<C>(&mut self, channel: &mut C) -> Result<TaskStatus>
    where
        C: ByteChannel + ?Sized,
    {
        loop {
            if self.resume == RxResume::Acquire {
                self.parser.reset();
                self.resume = RxResume::Pull;
            }

            let Some(byte) = channel.try_receive_byte()? else {
                return Ok(TaskStatus::Waiting);
            };

            let hunting = self.parser.state() == ParserState::AwaitingStart;
            let outcome = self.parser.feed(byte);
            if hunting && self.parser.state() != ParserState::AwaitingStart {
                self.begin_acquisition();
            }

            match outcome {
                Outcome::Waiting => {}
                Outcome::LengthInvalid => {
                    warn!("invalid frame length, sending NACK");
                    self.reject(ReceiveResult::LengthInvalid);
                    channel.send_ack(NACK)?;
                }
                Outcome::ChecksumInvalid => {
                    warn!("invalid frame (end marker or checksum), sending NACK");
                    self.reject(ReceiveResult::ChecksumInvalid);
                    channel.send_ack(NACK)?;
                    return Ok(TaskStatus::Yielded);
                }
                Outcome::FrameReady => {
                    if let Some(frame) = self.parser.take_frame() {
                        self.payload = frame.payload;
                    }
                    self.message_received = true;
                    self.result = Some(ReceiveResult::Success);
                    self.stats.frames_accepted += 1;
                    self.stats.acks_sent += 1;
                    self.resume = RxResume::Acquire;
                    info!(len = self.payload.len(), "valid frame received, sending ACK");
                    channel.send_ack(ACK)?;
                    return Ok(TaskStatus::Yielded);
                }
            }
        }
    }

    fn begin_acquisition(&mut self) {
        if self.message_received {
            debug!(len = self.payload.len(), "unread message discarded by next frame");
        }
        self.message_received = false;
        self.payload = Bytes::new();
    }

    fn reject(&mut self, result: ReceiveResult) {
        self.result = Some(result);
        self.stats.frames_rejected += 1;
        self.stats.nacks_sent += 1;
        self.resume = RxResume::Acquire;
    }

    /// Take the last accepted payload if it has not been taken yet.
    ///
    /// The received flag is edge-triggered: a payload that is not taken
    /// before the next frame starts arriving is discarded.
    pub fn take_message(&mut self) -> Option<Bytes> {
        if !self.message_received {
            return None;
        }
        self.message_received = false;
        debug!(len = self.payload.len(), "message taken");
        Some(self.payload.clone())
    }

    /// Abandon any partial frame and forget recorded results.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.resume = RxResume::Acquire;
        self.message_received = false;
        self.result = None;
        self.payload = Bytes::new();
    }

    /// `true` when an accepted payload is waiting to be taken.
    pub fn message_received(&self) -> bool {
        self.message_received
    }

    /// Payload accepted by the latest acquisition; empty once a new frame
    /// has started or the last one was rejected.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length of [`payload`](Self::payload).
    pub fn received_len(&self) -> usize {
        self.payload.len()
    }

    /// Result of the most recently completed acquisition.
    pub fn result(&self) -> Option<ReceiveResult> {
        self.result
    }

    pub fn parser_state(&self) -> ParserState {
        self.parser.state()
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new(&LinkConfig::default())
    }
}
