//! Failure-injecting store doubles for error propagation tests.

use std::sync::Mutex;
use std::time::Duration;

use lease_lock_core::error::{LockError, LockResult};
use lease_lock_core::store::LeaseStore;
use lease_lock_memory::MemoryLeaseStore;

/// Store that rejects every operation with a permanent error.
///
/// Simulates the access-denied class of failures the coordinator must
/// surface within one poll tick instead of retrying forever.
pub struct DenyingLeaseStore;

impl LeaseStore for DenyingLeaseStore {
    async fn try_acquire(
        &self,
        _resource: &str,
        _owner: &str,
        _lease_duration: Duration,
    ) -> LockResult<bool> {
        Err(LockError::Permanent(Box::new(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ))))
    }

    async fn release(&self, _resource: &str, _owner: &str) -> LockResult<()> {
        Err(LockError::Permanent(Box::new(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ))))
    }

    async fn ensure_schema(&self) -> LockResult<()> {
        Ok(())
    }
}

/// Store that fails the first `failures` acquire attempts with a transient
/// error, then delegates to an in-memory store.
pub struct FlakyLeaseStore {
    failures_left: Mutex<u32>,
    inner: MemoryLeaseStore,
}

impl FlakyLeaseStore {
    pub fn new(failures: u32) -> Self {
        Self {
            failures_left: Mutex::new(failures),
            inner: MemoryLeaseStore::new(),
        }
    }
}

impl LeaseStore for FlakyLeaseStore {
    async fn try_acquire(
        &self,
        resource: &str,
        owner: &str,
        lease_duration: Duration,
    ) -> LockResult<bool> {
        {
            let mut failures_left = self.failures_left.lock().unwrap();
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(LockError::Transient(Box::new(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "throttled",
                ))));
            }
        }
        self.inner.try_acquire(resource, owner, lease_duration).await
    }

    async fn release(&self, resource: &str, owner: &str) -> LockResult<()> {
        self.inner.release(resource, owner).await
    }

    async fn ensure_schema(&self) -> LockResult<()> {
        self.inner.ensure_schema().await
    }
}
