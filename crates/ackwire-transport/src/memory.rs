use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::error::Result;
use crate::traits::ByteChannel;

const INITIAL_BUFFER_CAPACITY: usize = 512;

/// Delivery counters kept by [`MemoryChannel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Frames handed to `send`, delivered or not.
    pub frames_sent: u64,
    /// Frames discarded by the loss model.
    pub frames_dropped: u64,
    /// Frames delivered with a damaged checksum byte.
    pub frames_corrupted: u64,
    /// Acknowledgment bytes signalled by the receiving side.
    pub acks_sent: u64,
    /// Acknowledgment bytes consumed by the sending side.
    pub acks_received: u64,
}

/// In-process loopback channel with a configurable fault model.
///
/// Sent frames are appended to a single inbound byte queue; the
/// acknowledgment signal is a one-slot mailbox where a newer ack overwrites
/// an unread one. Faults apply per frame, in this order:
///
/// | Fault         | Effect                                               |
/// |---------------|------------------------------------------------------|
/// | total loss    | every frame is dropped while enabled                 |
/// | drop next N   | the next N frames are dropped                        |
/// | corrupt next N| the next N frames have their checksum byte inverted  |
#[derive(Debug)]
pub struct MemoryChannel {
    inbound: BytesMut,
    ack: Option<u8>,
    total_loss: bool,
    drop_next: usize,
    corrupt_next: usize,
    stats: ChannelStats,
}

impl MemoryChannel {
    /// Create a fault-free channel.
    pub fn new() -> Self {
        Self {
            inbound: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            ack: None,
            total_loss: false,
            drop_next: 0,
            corrupt_next: 0,
            stats: ChannelStats::default(),
        }
    }

    /// Drop every frame while `enabled` is set.
    pub fn set_total_loss(&mut self, enabled: bool) {
        self.total_loss = enabled;
    }

    /// Whether total loss is currently simulated.
    pub fn total_loss(&self) -> bool {
        self.total_loss
    }

    /// Drop the next `count` frames, then deliver normally.
    pub fn drop_next_frames(&mut self, count: usize) {
        self.drop_next = count;
    }

    /// Invert the checksum byte of the next `count` delivered frames.
    ///
    /// The checksum sits second to last in an ackwire frame.
    pub fn corrupt_next_frames(&mut self, count: usize) {
        self.corrupt_next = count;
    }

    /// Inject raw bytes into the inbound queue, bypassing the fault model.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.inbound.extend_from_slice(bytes);
    }

    /// Number of frame bytes waiting to be received.
    pub fn pending_bytes(&self) -> usize {
        self.inbound.len()
    }

    /// Peek at the unread acknowledgment without consuming it.
    pub fn pending_ack(&self) -> Option<u8> {
        self.ack
    }

    /// Delivery counters since construction or the last [`reset`](Self::reset).
    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Clear queued bytes, the ack mailbox, the fault model and counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteChannel for MemoryChannel {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.stats.frames_sent += 1;

        if self.total_loss || self.drop_next > 0 {
            self.drop_next = self.drop_next.saturating_sub(1);
            self.stats.frames_dropped += 1;
            debug!(len = bytes.len(), "memory channel dropped frame");
            return Ok(());
        }

        let start = self.inbound.len();
        self.inbound.extend_from_slice(bytes);

        if self.corrupt_next > 0 && bytes.len() >= 2 {
            self.corrupt_next -= 1;
            let checksum_at = start + bytes.len() - 2;
            self.inbound[checksum_at] ^= 0xFF;
            self.stats.frames_corrupted += 1;
            debug!(len = bytes.len(), "memory channel corrupted frame");
        }

        Ok(())
    }

    fn try_receive_byte(&mut self) -> Result<Option<u8>> {
        if self.inbound.has_remaining() {
            Ok(Some(self.inbound.get_u8()))
        } else {
            Ok(None)
        }
    }

    fn send_ack(&mut self, ack: u8) -> Result<()> {
        self.stats.acks_sent += 1;
        self.ack = Some(ack);
        Ok(())
    }

    fn try_receive_ack(&mut self) -> Result<Option<u8>> {
        let ack = self.ack.take();
        if ack.is_some() {
            self.stats.acks_received += 1;
        }
        Ok(ack)
    }
}
