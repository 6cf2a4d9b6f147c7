//! The acquire/retry/release protocol.
//!
//! [`LockCoordinator`] turns the single conditional-write primitive exposed
//! by a [`LeaseStore`] into a blocking `acquire` call. Only contention is
//! absorbed by the polling loop; transient store errors are retried up to a
//! bounded budget and every other failure propagates immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{Span, instrument};

use crate::backoff::BackoffPolicy;
use crate::clock::{Clock, SystemClock};
use crate::error::{LockError, LockResult};
use crate::handle::LeaseHandle;
use crate::lease::{Lease, create_owner_token};
use crate::store::LeaseStore;
use crate::timeout::{Timeout, TimeoutValue};

/// Default polling interval between acquisition attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default cap on the backed-off contention delay.
pub const DEFAULT_MAX_POLL_DELAY: Duration = Duration::from_secs(8);

/// Default budget of consecutive transient-error retries.
pub const DEFAULT_TRANSIENT_RETRY_LIMIT: u32 = 5;

/// Builder for [`LockCoordinator`] configuration.
pub struct LockCoordinatorBuilder<S> {
    store: S,
    backoff: BackoffPolicy,
    transient_retry_limit: u32,
    clock: Arc<dyn Clock>,
}

impl<S: LeaseStore> LockCoordinatorBuilder<S> {
    fn new(store: S) -> Self {
        Self {
            store,
            backoff: BackoffPolicy::exponential(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_POLL_DELAY),
            transient_retry_limit: DEFAULT_TRANSIENT_RETRY_LIMIT,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the base delay between acquisition attempts.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.backoff.initial = interval;
        if self.backoff.max < interval {
            self.backoff.max = interval;
        }
        self
    }

    /// Replaces the whole backoff policy.
    ///
    /// Use [`BackoffPolicy::fixed`] to reproduce plain fixed-interval
    /// polling with no growth.
    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    /// Sets how many consecutive transient store errors are retried before
    /// the last one is surfaced to the caller.
    pub fn transient_retry_limit(mut self, limit: u32) -> Self {
        self.transient_retry_limit = limit;
        self
    }

    /// Overrides the clock used for lease expiry bookkeeping.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the coordinator.
    pub fn build(self) -> LockCoordinator<S> {
        LockCoordinator {
            store: Arc::new(self.store),
            backoff: self.backoff,
            transient_retry_limit: self.transient_retry_limit,
            clock: self.clock,
        }
    }
}

/// Coordinates lease acquisition against a [`LeaseStore`].
///
/// Each `acquire` call owns its own polling state; concurrent acquisitions
/// on one coordinator (same or different resources) never share timers.
/// Acquisition order across waiters is not FIFO: whichever poller's
/// conditional write lands first wins.
pub struct LockCoordinator<S> {
    store: Arc<S>,
    backoff: BackoffPolicy,
    transient_retry_limit: u32,
    clock: Arc<dyn Clock>,
}

impl<S: LeaseStore> LockCoordinator<S> {
    /// Creates a coordinator with default settings.
    pub fn new(store: S) -> Self {
        Self::builder(store).build()
    }

    /// Returns a builder for custom poll/backoff/clock configuration.
    pub fn builder(store: S) -> LockCoordinatorBuilder<S> {
        LockCoordinatorBuilder::new(store)
    }

    fn validate(resource: &str, lease_duration: Duration) -> LockResult<()> {
        if resource.is_empty() {
            return Err(LockError::InvalidName(
                "resource name cannot be empty".to_string(),
            ));
        }
        if lease_duration.is_zero() {
            return Err(LockError::InvalidDuration(lease_duration));
        }
        Ok(())
    }

    /// Acquires the lease for `resource`, waiting up to `timeout`.
    ///
    /// # Arguments
    ///
    /// * `resource` - Non-empty lock name
    /// * `lease_duration` - How long the lease stays valid after each
    ///   successful write; must upper-bound the critical section
    /// * `timeout` - Maximum time to wait. `None` means wait indefinitely.
    ///
    /// # Returns
    ///
    /// * `Ok(handle)` - Lease acquired; release via the handle
    /// * `Err(LockError::Timeout)` - Deadline expired while polling
    /// * `Err(LockError::Transient)` - Store kept failing past the retry
    ///   budget
    /// * `Err(LockError::Permanent)` - Store reported a non-retryable
    ///   failure
    ///
    /// # Cancellation
    ///
    /// Dropping the returned future stops the polling loop. For an explicit
    /// cancel signal, see [`acquire_with_cancel`](Self::acquire_with_cancel).
    #[instrument(
        skip(self),
        fields(
            lock.resource = %resource,
            lease_ms = lease_duration.as_millis() as u64,
            timeout = ?timeout,
        )
    )]
    pub async fn acquire(
        &self,
        resource: &str,
        lease_duration: Duration,
        timeout: Timeout,
    ) -> LockResult<LeaseHandle<S>> {
        let (_tx, cancel) = watch::channel(false);
        self.acquire_inner(resource, lease_duration, timeout, cancel)
            .await
    }

    /// Like [`acquire`](Self::acquire), but also stops polling and returns
    /// [`LockError::Cancelled`] once `cancel` observes `true`.
    #[instrument(
        skip(self, cancel),
        fields(
            lock.resource = %resource,
            lease_ms = lease_duration.as_millis() as u64,
            timeout = ?timeout,
        )
    )]
    pub async fn acquire_with_cancel(
        &self,
        resource: &str,
        lease_duration: Duration,
        timeout: Timeout,
        cancel: watch::Receiver<bool>,
    ) -> LockResult<LeaseHandle<S>> {
        self.acquire_inner(resource, lease_duration, timeout, cancel)
            .await
    }

    async fn acquire_inner(
        &self,
        resource: &str,
        lease_duration: Duration,
        timeout: Timeout,
        mut cancel: watch::Receiver<bool>,
    ) -> LockResult<LeaseHandle<S>> {
        Self::validate(resource, lease_duration)?;

        let owner = create_owner_token();
        let timeout_value = TimeoutValue::from(timeout);
        let start = Instant::now();
        let mut attempts: u32 = 0;
        let mut transient_attempts: u32 = 0;
        // Cleared once the cancel sender is gone, so a closed channel does
        // not starve the sleep branch of the select below.
        let mut cancel_active = true;

        loop {
            if *cancel.borrow() {
                return Err(LockError::Cancelled);
            }

            // Snapshot now before the write so the handle's expiry matches
            // what the store recorded (exactly, under a shared clock).
            let now = self.clock.epoch_millis();
            attempts += 1;

            match self
                .store
                .try_acquire(resource, &owner, lease_duration)
                .await
            {
                Ok(true) => {
                    Span::current().record("acquired", true);
                    Span::current().record("elapsed_ms", start.elapsed().as_millis() as u64);
                    Span::current().record("attempts", attempts);
                    let lease = Lease {
                        resource: resource.to_string(),
                        owner,
                        expires_at: now + lease_duration.as_millis() as u64,
                    };
                    return Ok(LeaseHandle::new(
                        self.store.clone(),
                        self.clock.clone(),
                        lease,
                    ));
                }
                Ok(false) => {
                    // Contention: another unexpired lease exists. Wait for
                    // the next tick.
                    transient_attempts = 0;
                }
                Err(err) if err.is_retryable() => {
                    transient_attempts += 1;
                    if transient_attempts > self.transient_retry_limit {
                        Span::current().record("acquired", false);
                        Span::current().record("error", "transient retry budget exhausted");
                        return Err(err);
                    }
                    tracing::debug!(
                        error = %err,
                        attempt = transient_attempts,
                        "transient store error during acquire; retrying"
                    );
                }
                Err(err) => {
                    Span::current().record("acquired", false);
                    Span::current().record("error", err.to_string());
                    return Err(err);
                }
            }

            let mut delay = self.backoff.jittered_delay(attempts.saturating_sub(1));

            if let Some(remaining) = timeout_value.remaining(start.elapsed()) {
                if remaining.is_zero() {
                    Span::current().record("acquired", false);
                    Span::current().record("error", "timeout");
                    return Err(LockError::Timeout(
                        timeout_value.as_duration().unwrap_or(Duration::ZERO),
                    ));
                }
                if delay > remaining {
                    delay = remaining;
                }
            }

            if cancel_active {
                let sleep = tokio::time::sleep(delay);
                tokio::pin!(sleep);
                loop {
                    tokio::select! {
                        _ = &mut sleep => break,
                        changed = cancel.changed() => match changed {
                            Ok(()) => {
                                if *cancel.borrow() {
                                    Span::current().record("acquired", false);
                                    Span::current().record("error", "cancelled");
                                    return Err(LockError::Cancelled);
                                }
                                // Value other than true; the tick keeps
                                // running.
                            }
                            Err(_) => {
                                cancel_active = false;
                                (&mut sleep).await;
                                break;
                            }
                        },
                    }
                }
            } else {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Attempts to acquire the lease without waiting.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(handle))` - Lease acquired on the first conditional write
    /// * `Ok(None)` - Another unexpired lease holds the resource
    /// * `Err(...)` - Store failure
    #[instrument(
        skip(self),
        fields(lock.resource = %resource, lease_ms = lease_duration.as_millis() as u64)
    )]
    pub async fn try_acquire(
        &self,
        resource: &str,
        lease_duration: Duration,
    ) -> LockResult<Option<LeaseHandle<S>>> {
        Self::validate(resource, lease_duration)?;

        let owner = create_owner_token();
        let now = self.clock.epoch_millis();

        if self
            .store
            .try_acquire(resource, &owner, lease_duration)
            .await?
        {
            Span::current().record("acquired", true);
            let lease = Lease {
                resource: resource.to_string(),
                owner,
                expires_at: now + lease_duration.as_millis() as u64,
            };
            Ok(Some(LeaseHandle::new(
                self.store.clone(),
                self.clock.clone(),
                lease,
            )))
        } else {
            Span::current().record("acquired", false);
            Span::current().record("reason", "lock_held");
            Ok(None)
        }
    }
}
