use crate::error::Result;

/// The narrow channel contract the link layer is written against.
///
/// Frame bytes flow one way (`send` / `try_receive_byte`); acknowledgment
/// bytes flow back on a separate narrow-band signal (`send_ack` /
/// `try_receive_ack`). None of the operations block: "nothing available"
/// is `Ok(None)`.
pub trait ByteChannel {
    /// Queue a complete encoded frame for delivery.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Pull the next available frame byte, if any.
    fn try_receive_byte(&mut self) -> Result<Option<u8>>;

    /// Signal a single acknowledgment byte back to the sender.
    fn send_ack(&mut self, ack: u8) -> Result<()>;

    /// Take the pending acknowledgment byte, if any.
    ///
    /// Edge-triggered: a returned acknowledgment is consumed.
    fn try_receive_ack(&mut self) -> Result<Option<u8>>;
}

impl<C: ByteChannel + ?Sized> ByteChannel for &mut C {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn try_receive_byte(&mut self) -> Result<Option<u8>> {
        (**self).try_receive_byte()
    }

    fn send_ack(&mut self, ack: u8) -> Result<()> {
        (**self).send_ack(ack)
    }

    fn try_receive_ack(&mut self) -> Result<Option<u8>> {
        (**self).try_receive_ack()
    }
}

/// Millisecond clock consulted by link timers.
///
/// Timer expiry is computed purely from `now()`, so a clock that only moves
/// when told to gives fully deterministic retry behavior.
pub trait Clock {
    /// Current time in milliseconds.
    fn now(&self) -> u64;
}

impl<K: Clock + ?Sized> Clock for &K {
    fn now(&self) -> u64 {
        (**self).now()
    }
}
