//! In-memory lease store implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lease_lock_core::clock::{Clock, SystemClock};
use lease_lock_core::error::LockResult;
use lease_lock_core::lease::Lease;
use lease_lock_core::store::LeaseStore;

struct LeaseRow {
    owner: String,
    expires_at: u64,
}

/// In-memory [`LeaseStore`].
///
/// A single mutex guard spans each condition check and write, giving the
/// same atomicity the external store's conditional put provides. The row
/// layout and condition mirror the DynamoDB backend: a put succeeds iff no
/// row exists for the resource or the existing row's `expires_at` is
/// earlier than now; expired rows linger until overwritten or released.
pub struct MemoryLeaseStore {
    leases: Mutex<HashMap<String, LeaseRow>>,
    clock: Arc<dyn Clock>,
}

impl MemoryLeaseStore {
    /// Creates a store on the system wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a store on a caller-provided clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            leases: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the unexpired lease for `resource`, if any.
    pub fn live_lease(&self, resource: &str) -> Option<Lease> {
        let now = self.clock.epoch_millis();
        let leases = self.leases.lock().unwrap();
        leases.get(resource).and_then(|row| {
            if row.expires_at < now {
                None
            } else {
                Some(Lease {
                    resource: resource.to_string(),
                    owner: row.owner.clone(),
                    expires_at: row.expires_at,
                })
            }
        })
    }

    /// Number of rows physically present, expired rows included.
    pub fn row_count(&self) -> usize {
        self.leases.lock().unwrap().len()
    }
}

impl Default for MemoryLeaseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaseStore for MemoryLeaseStore {
    async fn try_acquire(
        &self,
        resource: &str,
        owner: &str,
        lease_duration: Duration,
    ) -> LockResult<bool> {
        let now = self.clock.epoch_millis();
        let expires_at = now + lease_duration.as_millis() as u64;

        let mut leases = self.leases.lock().unwrap();
        match leases.get(resource) {
            Some(row) if row.expires_at >= now => {
                tracing::trace!(resource, "conditional put rejected: live lease exists");
                Ok(false)
            }
            _ => {
                leases.insert(
                    resource.to_string(),
                    LeaseRow {
                        owner: owner.to_string(),
                        expires_at,
                    },
                );
                Ok(true)
            }
        }
    }

    async fn release(&self, resource: &str, owner: &str) -> LockResult<()> {
        let mut leases = self.leases.lock().unwrap();
        if let Some(row) = leases.get(resource)
            && row.owner == owner
        {
            leases.remove(resource);
        }
        // Missing row or owner mismatch: already released or stolen after
        // expiry. Idempotent success either way.
        Ok(())
    }

    async fn ensure_schema(&self) -> LockResult<()> {
        Ok(())
    }
}
