//! Ownership handle for a held lease.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::clock::Clock;
use crate::error::LockResult;
use crate::lease::Lease;
use crate::store::LeaseStore;

/// Handle to a held lease.
///
/// The caller's critical section runs between acquisition and
/// [`release`](Self::release). The coordinator never extends the lease, so
/// the lease duration must conservatively upper-bound the critical
/// section's runtime: once `expires_at` passes, a competitor can steal the
/// lease even while this handle still exists. Use
/// [`is_expired`](Self::is_expired) to detect that silently-lost state.
///
/// Release is an explicit action; there is no release-on-drop. A dropped
/// handle simply lets the lease run out its expiry.
///
/// # Example
///
/// ```rust,ignore
/// let handle = coordinator
///     .acquire("job-42", Duration::from_secs(30), None)
///     .await?;
/// do_protected_work().await;
/// handle.release().await?;
/// ```
pub struct LeaseHandle<S: LeaseStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    lease: Lease,
}

impl<S: LeaseStore> LeaseHandle<S> {
    pub(crate) fn new(store: Arc<S>, clock: Arc<dyn Clock>, lease: Lease) -> Self {
        Self {
            store,
            clock,
            lease,
        }
    }

    /// The locked resource name.
    pub fn resource(&self) -> &str {
        &self.lease.resource
    }

    /// The owner token this acquisition wrote to the store.
    pub fn owner(&self) -> &str {
        &self.lease.owner
    }

    /// Epoch millis at which the lease becomes invalid.
    pub fn expires_at(&self) -> u64 {
        self.lease.expires_at
    }

    /// Time left on the lease; zero once it has expired.
    pub fn remaining(&self) -> Duration {
        let now = self.clock.epoch_millis();
        Duration::from_millis(self.lease.expires_at.saturating_sub(now))
    }

    /// Whether the lease has passed its expiry and may have been stolen.
    pub fn is_expired(&self) -> bool {
        self.lease.is_expired_at(self.clock.epoch_millis())
    }

    /// Releases the lease, deleting the store row if still owned.
    ///
    /// Safe to call after server-side expiry: the delete is conditioned on
    /// the owner token, so a successor's lease is never removed, and a
    /// missing row is not an error.
    #[instrument(
        skip(self),
        fields(lock.resource = %self.lease.resource, lock.owner = %self.lease.owner)
    )]
    pub async fn release(self) -> LockResult<()> {
        self.store
            .release(&self.lease.resource, &self.lease.owner)
            .await
    }
}

impl<S: LeaseStore> std::fmt::Debug for LeaseHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaseHandle")
            .field("resource", &self.lease.resource)
            .field("owner", &self.lease.owner)
            .field("expires_at", &self.lease.expires_at)
            .finish()
    }
}
