//! Quiet-period debouncer for the name field.
//!
//! Time is supplied by the caller so the policy stays deterministic.

use std::time::{Duration, Instant};

/// Restartable quiet-period timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    pending_since: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending_since: None,
        }
    }

    /// Records an edit at `now`, restarting the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    pub fn cancel(&mut self) {
        self.pending_since = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Returns `true` once when the quiet period has elapsed since the last
    /// edit, clearing the pending state.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.quiet_period => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }
}
