//! One-shot timeout against an external millisecond clock.

/// Timer state for one pending wait.
///
/// Expiry is `now - start >= duration`, evaluated against whatever `now`
/// the caller passes in. A stopped timer never reports expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    start_ms: u64,
    duration_ms: u64,
    active: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer starting at `now_ms`.
    pub fn arm(&mut self, now_ms: u64, duration_ms: u64) {
        self.start_ms = now_ms;
        self.duration_ms = duration_ms;
        self.active = true;
    }

    /// `true` once `duration_ms` has elapsed since arming.
    pub fn expired(&self, now_ms: u64) -> bool {
        self.active && now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Milliseconds left before expiry, `None` when stopped.
    pub fn remaining(&self, now_ms: u64) -> Option<u64> {
        self.active.then(|| {
            self.duration_ms
                .saturating_sub(now_ms.saturating_sub(self.start_ms))
        })
    }
}
