//! Contention backoff policy.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff with jitter for the polling loop.
///
/// The first delay equals the configured poll interval; each subsequent
/// contended attempt doubles it up to `max`. A ±25% jitter spreads waiters
/// out so competing pollers do not hammer the store in lockstep once a
/// lease expires.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Base delay between acquisition attempts.
    pub initial: Duration,
    /// Growth factor applied per contended attempt.
    pub multiplier: u32,
    /// Upper bound on the delay.
    pub max: Duration,
}

impl BackoffPolicy {
    /// Fixed-interval policy: every delay equals `interval`, no growth.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial: interval,
            multiplier: 1,
            max: interval,
        }
    }

    /// Exponential policy growing from `initial` up to `max`.
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            multiplier: 2,
            max,
        }
    }

    /// Delay before attempt `attempt` (zero-based), without jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt.min(16));
        self.initial.saturating_mul(factor).min(self.max)
    }

    /// Delay before attempt `attempt`, with ±25% jitter applied.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let base = self.delay(attempt);
        let jitter_range = base.as_millis() as u64 / 4;
        if jitter_range == 0 {
            return base;
        }

        let mut rng = rand::thread_rng();
        let offset = rng.gen_range(0..=jitter_range * 2) as i64 - jitter_range as i64;
        if offset >= 0 {
            base + Duration::from_millis(offset as u64)
        } else {
            base.saturating_sub(Duration::from_millis(offset.unsigned_abs()))
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::exponential(Duration::from_millis(1000), Duration::from_secs(8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_policy_never_grows() {
        let policy = BackoffPolicy::fixed(Duration::from_millis(100));
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(10), Duration::from_millis(100));
    }

    #[test]
    fn exponential_policy_doubles_and_caps() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_millis(400));
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
        assert_eq!(policy.delay(u32::MAX), Duration::from_millis(400));
    }

    #[test]
    fn jitter_stays_within_quarter_of_base() {
        let policy = BackoffPolicy::fixed(Duration::from_millis(1000));
        for _ in 0..100 {
            let d = policy.jittered_delay(0);
            assert!(d >= Duration::from_millis(750));
            assert!(d <= Duration::from_millis(1250));
        }
    }
}
