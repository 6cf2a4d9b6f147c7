//! Lease record and owner token helpers.

use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// A time-bounded ownership record for a named resource.
///
/// This is the sole persisted entity. For a given `resource`, at most one
/// lease with `expires_at` in the future may exist at any real-world
/// instant; the backing store's conditional write enforces this. Expired
/// rows may linger (expiry is advisory, not store-enforced TTL) and are
/// treated as absent by the acquisition condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    /// The lock's name; partition key in the store.
    pub resource: String,
    /// Token identifying the acquirer that won the conditional write.
    ///
    /// Release is conditioned on this token so one caller cannot delete
    /// another's live lease.
    pub owner: String,
    /// Epoch millis at which the lease becomes invalid.
    pub expires_at: u64,
}

impl Lease {
    /// Whether the lease is dead at the given instant.
    pub fn is_expired_at(&self, now_millis: u64) -> bool {
        self.expires_at < now_millis
    }
}

/// Generates a unique owner token for one acquisition attempt.
///
/// Format: `{process_id}_{counter}_{uuid}`. The counter disambiguates
/// concurrent acquisitions within one process; the UUID disambiguates
/// across processes sharing a PID namespace.
pub fn create_owner_token() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = process::id();

    format!("{}_{}_{}", pid, counter, Uuid::new_v4().simple())
}
