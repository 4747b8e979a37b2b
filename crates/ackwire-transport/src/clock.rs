use std::time::Instant;

use crate::traits::Clock;

/// A clock that only moves when explicitly advanced.
///
/// Used by simulations and tests so that timer expiry depends on nothing
/// but the calls made against it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: u64,
}

impl ManualClock {
    /// Create a clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        Self { now_ms }
    }

    /// Move the clock forward by `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms = self.now_ms.saturating_add(ms);
    }

    /// Jump the clock to an absolute time.
    pub fn set(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now_ms
    }
}

/// Real monotonic clock, measured from construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
