//! Session configuration.

use std::time::Duration;

/// Quiet period after the last name edit before resolution fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Tunables for one form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Zero means every `poll` after an edit resolves immediately.
    pub debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl SessionConfig {
    pub fn with_debounce(debounce: Duration) -> Self {
        Self { debounce }
    }
}
