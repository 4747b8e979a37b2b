//! Send side of the stop-and-wait link.
//!
//! # Session lifecycle
//!
//! ```text
//!  Idle ──start──▶ Sending ──frame sent──▶ AwaitingAck ──ACK──▶ Succeeded
//!                     ▲                        │
//!                     │                NACK or timeout
//!                     │                        ▼
//!                     └──── next step ──── Retrying ──retries exhausted──▶ Failed
//! ```
//!
//! `Sending` and `Retrying` are resume points: the (re)transmission
//! happens at the start of the next [`Transmitter::step`], so every retry
//! decision is visible to the caller before the frame goes out again.

use ackwire_frame::{
    encode_capacity, encode_frame, validate_payload, EncodeError, ACK, MAX_PAYLOAD, NACK,
};
use ackwire_transport::{ByteChannel, Clock};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::error::{Result, SessionError};
use crate::task::TaskStatus;
use crate::timer::Timer;

const FRAME_BUFFER_LEN: usize = encode_capacity(MAX_PAYLOAD);

/// Position of a transmission session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    /// No session started.
    Idle,
    /// Frame encoded, to be sent on the next step.
    Sending,
    /// Frame sent, timer armed.
    AwaitingAck,
    /// NACK or timeout seen, retransmission due on the next step.
    Retrying,
    Succeeded,
    Failed,
}

/// Terminal result of a transmission session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitResult {
    /// The peer acknowledged the frame.
    Success,
    /// The retry bound was reached, through timeouts, NACKs or both.
    Timeout,
    /// The payload could not be encoded.
    Encode(EncodeError),
}

/// Resumable transmitter task.
#[derive(Debug, Clone)]
pub struct Transmitter {
    config: LinkConfig,
    phase: TxPhase,
    payload: Bytes,
    frame: [u8; FRAME_BUFFER_LEN],
    frame_len: usize,
    retry_count: u8,
    transmissions: u32,
    timer: Timer,
    complete: bool,
    result: Option<TransmitResult>,
}

impl Transmitter {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            phase: TxPhase::Idle,
            payload: Bytes::new(),
            frame: [0u8; FRAME_BUFFER_LEN],
            frame_len: 0,
            retry_count: 0,
            transmissions: 0,
            timer: Timer::new(),
            complete: false,
            result: None,
        }
    }

    /// Begin a new session for `payload`, superseding any previous one.
    ///
    /// An empty or oversized payload is rejected with
    /// [`SessionError::InvalidParam`] and leaves the current session as is.
    pub fn start(&mut self, payload: impl Into<Bytes>) -> Result<()> {
        let payload = payload.into();
        validate_payload(&payload, self.config.max_payload_size)
            .map_err(|err| SessionError::InvalidParam(err.to_string()))?;

        self.abandon();
        self.payload = payload;

        match encode_frame(&self.payload, &mut self.frame) {
            Ok(written) => {
                self.frame_len = written;
                self.phase = TxPhase::Sending;
                debug!(len = self.payload.len(), "transmission session started");
            }
            Err(err) => {
                warn!(%err, "frame encoding failed");
                self.finish(TransmitResult::Encode(err));
            }
        }
        Ok(())
    }

    /// Advance the session until it has to wait.
    pub fn step<C, K>(&mut self, channel: &mut C, clock: &K) -> Result<TaskStatus>
    where
        C: ByteChannel + ?Sized,
        K: Clock + ?Sized,
    {
        loop {
            match self.phase {
                TxPhase::Idle => return Ok(TaskStatus::Idle),
                TxPhase::Succeeded | TxPhase::Failed => return Ok(TaskStatus::Complete),
                TxPhase::Retrying => self.phase = TxPhase::Sending,
                TxPhase::Sending => {
                    channel.send(&self.frame[..self.frame_len])?;
                    self.transmissions += 1;
                    self.timer.arm(clock.now(), self.config.ack_timeout_ms);
                    self.phase = TxPhase::AwaitingAck;
                    debug!(
                        attempt = self.transmissions,
                        len = self.frame_len,
                        "frame transmitted"
                    );
                }
                TxPhase::AwaitingAck => match channel.try_receive_ack()? {
                    Some(ACK) => {
                        info!(attempts = self.transmissions, "ACK received, transmission complete");
                        self.finish(TransmitResult::Success);
                        return Ok(TaskStatus::Complete);
                    }
                    Some(NACK) => {
                        warn!(
                            retry = self.retry_count + 1,
                            max = self.config.max_retries,
                            "NACK received"
                        );
                        return Ok(self.retry_or_fail());
                    }
                    Some(other) => debug!(ack = other, "ignoring unknown acknowledgment byte"),
                    None if self.timer.expired(clock.now()) => {
                        warn!(
                            retry = self.retry_count + 1,
                            max = self.config.max_retries,
                            "acknowledgment timeout"
                        );
                        return Ok(self.retry_or_fail());
                    }
                    None => return Ok(TaskStatus::Waiting),
                },
            }
        }
    }

    /// Drop the current session without producing a result.
    pub fn abandon(&mut self) {
        self.phase = TxPhase::Idle;
        self.frame_len = 0;
        self.retry_count = 0;
        self.transmissions = 0;
        self.complete = false;
        self.result = None;
        self.timer.stop();
    }

    fn retry_or_fail(&mut self) -> TaskStatus {
        self.retry_count = self.retry_count.saturating_add(1);
        self.timer.stop();
        if self.retry_count < self.config.max_retries {
            self.phase = TxPhase::Retrying;
            TaskStatus::Yielded
        } else {
            warn!(
                attempts = self.transmissions,
                "max retries reached, transmission failed"
            );
            self.finish(TransmitResult::Timeout);
            TaskStatus::Complete
        }
    }

    fn finish(&mut self, result: TransmitResult) {
        self.phase = match result {
            TransmitResult::Success => TxPhase::Succeeded,
            TransmitResult::Timeout | TransmitResult::Encode(_) => TxPhase::Failed,
        };
        self.timer.stop();
        self.complete = true;
        self.result = Some(result);
    }

    pub fn phase(&self) -> TxPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Terminal result, once complete.
    pub fn result(&self) -> Option<TransmitResult> {
        self.result
    }

    /// Retries consumed so far (NACKs plus timeouts).
    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// Times the frame has been put on the channel in this session.
    pub fn transmissions(&self) -> u32 {
        self.transmissions
    }

    /// Payload of the current session.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encoded frame of the current session.
    pub fn frame(&self) -> &[u8] {
        &self.frame[..self.frame_len]
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new(LinkConfig::default())
    }
}
