use ackwire_transport::{ByteChannel, Clock, ManualClock};
use bytes::Bytes;
use tracing::debug;

use crate::config::LinkConfig;
use crate::error::Result;
use crate::receiver::{ReceiveResult, Receiver};
use crate::scheduler::{Scheduler, TickReport};
use crate::transmitter::{TransmitResult, Transmitter};

/// One endpoint pair driven by a scheduler: the "just works" layer.
///
/// Everything is polled: call [`send`](Self::send), then [`tick`](Self::tick)
/// until [`transmission_complete`](Self::transmission_complete), advancing
/// the clock between ticks.
#[derive(Debug)]
pub struct Link<C, K> {
    scheduler: Scheduler<C, K>,
    transmitter: Transmitter,
    receiver: Receiver,
    config: LinkConfig,
    ticks: u64,
}

impl<C: ByteChannel, K: Clock> Link<C, K> {
    /// Create a link with the default configuration.
    pub fn new(channel: C, clock: K) -> Self {
        let config = LinkConfig::default();
        Self {
            scheduler: Scheduler::new(channel, clock),
            transmitter: Transmitter::new(config.clone()),
            receiver: Receiver::new(&config),
            config,
            ticks: 0,
        }
    }

    /// Create a link with an explicit, validated configuration.
    pub fn with_config(channel: C, clock: K, config: LinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scheduler: Scheduler::new(channel, clock),
            transmitter: Transmitter::new(config.clone()),
            receiver: Receiver::new(&config),
            config,
            ticks: 0,
        })
    }

    /// Start transmitting `payload`, superseding any session in progress.
    pub fn send(&mut self, payload: impl Into<Bytes>) -> Result<()> {
        self.transmitter.start(payload)
    }

    /// Advance both tasks by one step.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.ticks += 1;
        self.scheduler
            .tick(&mut self.transmitter, &mut self.receiver)
    }

    /// Abandon the transmission and reset the receiver.
    pub fn reset(&mut self) {
        self.transmitter.abandon();
        self.receiver.reset();
        self.ticks = 0;
    }

    pub fn transmission_complete(&self) -> bool {
        self.transmitter.is_complete()
    }

    pub fn tx_result(&self) -> Option<TransmitResult> {
        self.transmitter.result()
    }

    pub fn retry_count(&self) -> u8 {
        self.transmitter.retry_count()
    }

    pub fn message_received(&self) -> bool {
        self.receiver.message_received()
    }

    pub fn received_payload(&self) -> &[u8] {
        self.receiver.payload()
    }

    pub fn rx_result(&self) -> Option<ReceiveResult> {
        self.receiver.result()
    }

    /// Take the received payload, clearing the received flag.
    pub fn take_message(&mut self) -> Option<Bytes> {
        self.receiver.take_message()
    }

    pub fn transmitter(&self) -> &Transmitter {
        &self.transmitter
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn channel(&self) -> &C {
        self.scheduler.channel()
    }

    pub fn channel_mut(&mut self) -> &mut C {
        self.scheduler.channel_mut()
    }

    pub fn clock(&self) -> &K {
        self.scheduler.clock()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Ticks run since construction or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl<C: ByteChannel> Link<C, ManualClock> {
    /// Move the logical clock forward.
    pub fn advance_time(&mut self, ms: u64) {
        self.scheduler.clock_mut().advance(ms);
    }

    /// Tick and advance the clock by `step_ms` until the transmission
    /// completes or `max_ticks` ticks have run.
    ///
    /// Returns `Ok(None)` if the session is still pending afterwards.
    pub fn run_until_complete(
        &mut self,
        max_ticks: usize,
        step_ms: u64,
    ) -> Result<Option<TransmitResult>> {
        for _ in 0..max_ticks {
            self.tick()?;
            if self.transmission_complete() {
                debug!(ticks = self.ticks, "transmission complete");
                return Ok(self.tx_result());
            }
            self.advance_time(step_ms);
        }
        Ok(self.tx_result())
    }
}

#[cfg(test)]
mod tests {
    use ackwire_transport::MemoryChannel;

    use super::*;
    use crate::error::SessionError;

    fn loopback() -> Link<MemoryChannel, ManualClock> {
        Link::new(MemoryChannel::new(), ManualClock::new())
    }

    #[test]
    fn fresh_link_is_quiet() {
        let link = loopback();
        assert!(!link.transmission_complete());
        assert!(!link.message_received());
        assert_eq!(link.tx_result(), None);
        assert_eq!(link.rx_result(), None);
        assert_eq!(link.clock().now(), 0);
        assert_eq!(link.ticks(), 0);
    }

    #[test]
    fn successful_transmission() {
        let mut link = loopback();
        link.send(vec![0xAA, 0xBB, 0xCC]).unwrap();

        let result = link.run_until_complete(100, 10).unwrap();
        assert_eq!(result, Some(TransmitResult::Success));
        assert!(link.message_received());
        assert_eq!(link.rx_result(), Some(ReceiveResult::Success));
        assert_eq!(link.received_payload(), &[0xAA, 0xBB, 0xCC]);
        assert_eq!(link.ticks(), 2);
    }

    #[test]
    fn invalid_send_is_rejected() {
        let mut link = loopback();
        assert!(matches!(
            link.send(Bytes::new()),
            Err(SessionError::InvalidParam(_))
        ));
        assert!(!link.transmission_complete());
    }

    #[test]
    fn with_config_validates() {
        let config = LinkConfig {
            max_retries: 0,
            ..LinkConfig::default()
        };
        let result = Link::with_config(MemoryChannel::new(), ManualClock::new(), config);
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn run_until_complete_reports_pending() {
        let mut link = loopback();
        link.channel_mut().set_total_loss(true);
        link.send(&b"x"[..]).unwrap();

        assert_eq!(link.run_until_complete(3, 10).unwrap(), None);
        assert!(!link.transmission_complete());
    }

    #[test]
    fn take_message_is_edge_triggered() {
        let mut link = loopback();
        link.send(&b"once"[..]).unwrap();
        link.run_until_complete(10, 10).unwrap();

        assert_eq!(link.take_message().unwrap().as_ref(), b"once");
        assert!(!link.message_received());
        assert!(link.take_message().is_none());
        assert_eq!(link.received_payload(), b"once");
    }

    #[test]
    fn reset_clears_both_sides() {
        let mut link = loopback();
        link.send(&b"x"[..]).unwrap();
        link.run_until_complete(10, 10).unwrap();

        link.reset();
        assert!(!link.transmission_complete());
        assert!(!link.message_received());
        assert_eq!(link.ticks(), 0);
    }
}
