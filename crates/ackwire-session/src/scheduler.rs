use ackwire_transport::{ByteChannel, Clock};

use crate::error::Result;
use crate::receiver::Receiver;
use crate::task::TaskStatus;
use crate::transmitter::Transmitter;

/// Status of both tasks after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub transmitter: TaskStatus,
    pub receiver: TaskStatus,
}

/// Cooperative round-robin over the transmitter and receiver.
///
/// Owns the channel and clock handles and threads them into each task.
/// A tick steps the transmitter, then the receiver, and returns; it never
/// sleeps, retries or advances time.
#[derive(Debug)]
pub struct Scheduler<C, K> {
    channel: C,
    clock: K,
}

impl<C: ByteChannel, K: Clock> Scheduler<C, K> {
    pub fn new(channel: C, clock: K) -> Self {
        Self { channel, clock }
    }

    /// Run one step of each task, transmitter first.
    pub fn tick(&mut self, tx: &mut Transmitter, rx: &mut Receiver) -> Result<TickReport> {
        let transmitter = tx.step(&mut self.channel, &self.clock)?;
        let receiver = rx.step(&mut self.channel)?;
        Ok(TickReport {
            transmitter,
            receiver,
        })
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut K {
        &mut self.clock
    }

    pub fn into_parts(self) -> (C, K) {
        (self.channel, self.clock)
    }
}
