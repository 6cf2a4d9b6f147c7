//! Timeout value helpers.

use std::time::Duration;

/// Represents a maximum wait for lock operations.
///
/// - `Some(duration)` - Wait up to this duration
/// - `None` - Wait indefinitely
pub type Timeout = Option<Duration>;

/// Internal helper for deadline calculations in the polling loop.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutValue {
    millis: i64, // -1 for infinite
}

impl TimeoutValue {
    pub const INFINITE: Self = Self { millis: -1 };

    pub fn is_infinite(&self) -> bool {
        self.millis < 0
    }

    pub fn as_duration(&self) -> Option<Duration> {
        if self.is_infinite() {
            None
        } else {
            Some(Duration::from_millis(self.millis as u64))
        }
    }

    /// Time left before the deadline, given time already spent waiting.
    ///
    /// Returns `None` for an infinite timeout (no deadline).
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.as_duration().map(|d| d.saturating_sub(elapsed))
    }
}

impl From<Option<Duration>> for TimeoutValue {
    fn from(timeout: Option<Duration>) -> Self {
        match timeout {
            None => Self::INFINITE,
            Some(d) => Self {
                millis: d.as_millis().min(i64::MAX as u128) as i64,
            },
        }
    }
}
