//! The lease store adapter seam.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LockResult;

/// Adapter over a strongly-consistent key-value store with conditional
/// writes.
///
/// Implementations translate lock operations into conditional operations
/// against the external store. All cross-process correctness rests on the
/// store evaluating the condition and the write as one atomic unit with
/// respect to concurrent writers on the same key; the adapter must never
/// substitute a client-side read-check-write sequence.
///
/// # Example
///
/// ```rust,ignore
/// let acquired = store
///     .try_acquire("job-42", &owner, Duration::from_secs(30))
///     .await?;
/// if acquired {
///     // we hold the lease until it expires or we release it
/// }
/// ```
pub trait LeaseStore: Send + Sync {
    /// Attempts one conditional write of a lease for `resource`.
    ///
    /// The store computes `now` from its clock and writes
    /// `{resource, owner, expires_at: now + lease_duration}` with the
    /// condition: *no record exists for `resource`, OR the existing
    /// record's `expires_at` is earlier than `now`*.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Write succeeded; the caller holds the lease
    /// * `Ok(false)` - Condition rejected: another unexpired lease exists
    ///   (contention, not an error)
    /// * `Err(...)` - Any other store failure, classified transient or
    ///   permanent
    fn try_acquire(
        &self,
        resource: &str,
        owner: &str,
        lease_duration: Duration,
    ) -> impl Future<Output = LockResult<bool>> + Send;

    /// Deletes the lease for `resource` if it is still owned by `owner`.
    ///
    /// Idempotent: a missing row, or a row owned by a later acquirer (our
    /// lease expired and was stolen), is success rather than an error.
    fn release(&self, resource: &str, owner: &str) -> impl Future<Output = LockResult<()>> + Send;

    /// Idempotently provisions the backing table/collection.
    ///
    /// Not on the hot path; invoked once at construction.
    fn ensure_schema(&self) -> impl Future<Output = LockResult<()>> + Send;
}

// Lets multiple coordinators (one per process role, or test acquirers)
// share a single store instance.
impl<S: LeaseStore> LeaseStore for Arc<S> {
    async fn try_acquire(
        &self,
        resource: &str,
        owner: &str,
        lease_duration: Duration,
    ) -> LockResult<bool> {
        (**self).try_acquire(resource, owner, lease_duration).await
    }

    async fn release(&self, resource: &str, owner: &str) -> LockResult<()> {
        (**self).release(resource, owner).await
    }

    async fn ensure_schema(&self) -> LockResult<()> {
        (**self).ensure_schema().await
    }
}
