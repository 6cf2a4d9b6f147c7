//! Clock abstraction for lease expiry.
//!
//! Lease expiry is advisory: it is evaluated by comparing wall-clock epoch
//! millis, not by store-enforced TTL deletion. Routing every time read
//! through [`Clock`] lets tests drive expiry deterministically with
//! [`ManualClock`] instead of sleeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of epoch-milliseconds timestamps.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn epoch_millis(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn epoch_millis(&self) -> u64 {
        (**self).epoch_millis()
    }
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for deterministic expiry tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock starting at the given epoch-millis instant.
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
        }
    }

    /// Advances the clock by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute instant.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn epoch_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.epoch_millis(), 1_000);
        clock.advance(500);
        assert_eq!(clock.epoch_millis(), 1_500);
        clock.set(100);
        assert_eq!(clock.epoch_millis(), 100);
    }

    #[test]
    fn system_clock_is_nonzero() {
        assert!(SystemClock.epoch_millis() > 0);
    }
}
