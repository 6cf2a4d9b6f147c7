//! Integration tests for the coordinator over the in-memory store.
//!
//! Tokio's paused clock drives the polling loop; a `ManualClock` shared by
//! the store and the coordinators drives lease expiry. Together they make
//! every contention/expiry scenario deterministic without real sleeping.

use std::sync::Arc;
use std::time::Duration;

use lease_lock_core::backoff::BackoffPolicy;
use lease_lock_core::clock::ManualClock;
use lease_lock_core::coordinator::LockCoordinator;
use lease_lock_core::error::LockError;
use lease_lock_memory::MemoryLeaseStore;
use tokio::time::Instant;

mod common;
use common::failing_store::{DenyingLeaseStore, FlakyLeaseStore};

const LEASE: Duration = Duration::from_millis(3_000);

fn acquirer(
    store: &Arc<MemoryLeaseStore>,
    clock: &Arc<ManualClock>,
) -> LockCoordinator<Arc<MemoryLeaseStore>> {
    LockCoordinator::builder(store.clone())
        .backoff(BackoffPolicy::fixed(Duration::from_millis(1_000)))
        .clock(clock.clone())
        .build()
}

fn shared_store() -> (Arc<ManualClock>, Arc<MemoryLeaseStore>) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let store = Arc::new(MemoryLeaseStore::with_clock(clock.clone()));
    (clock, store)
}

#[tokio::test]
async fn round_trip_leaves_no_live_row() {
    let (clock, store) = shared_store();
    let coordinator = acquirer(&store, &clock);

    let handle = coordinator
        .acquire("job-42", Duration::from_millis(5_000), None)
        .await
        .unwrap();
    assert!(store.live_lease("job-42").is_some());

    handle.release().await.unwrap();
    assert!(store.live_lease("job-42").is_none());
    assert_eq!(store.row_count(), 0);

    // A subsequent acquire succeeds immediately.
    let handle = coordinator
        .try_acquire("job-42", Duration::from_millis(5_000))
        .await
        .unwrap();
    assert!(handle.is_some());
}

#[tokio::test]
async fn exactly_one_acquirer_wins_the_first_tick() {
    let (clock, store) = shared_store();
    let a = acquirer(&store, &clock);
    let b = acquirer(&store, &clock);

    let first = a.try_acquire("job-42", LEASE).await.unwrap();
    let second = b.try_acquire("job-42", LEASE).await.unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
}

#[tokio::test]
async fn waiter_wins_next_poll_after_expiry() {
    let (clock, store) = shared_store();
    let a = acquirer(&store, &clock);
    let b = acquirer(&store, &clock);

    let handle = a.try_acquire("job-42", LEASE).await.unwrap().unwrap();
    assert!(b.try_acquire("job-42", LEASE).await.unwrap().is_none());

    // Holder A goes silent past its expiry; B's next poll succeeds.
    clock.advance(3_001);
    assert!(handle.is_expired());
    let stolen = b.acquire("job-42", LEASE, None).await.unwrap();
    assert_eq!(stolen.resource(), "job-42");
}

#[tokio::test(start_paused = true)]
async fn waiter_acquires_after_release() {
    let (clock, store) = shared_store();
    let a = acquirer(&store, &clock);

    let held = a.acquire("job-42", LEASE, None).await.unwrap();

    let waiter = {
        let store = store.clone();
        let clock = clock.clone();
        tokio::spawn(async move {
            let b = acquirer(&store, &clock);
            b.acquire("job-42", LEASE, None).await
        })
    };

    // Let the waiter start polling, then free the resource.
    tokio::time::sleep(Duration::from_millis(10)).await;
    held.release().await.unwrap();

    let handle = waiter.await.unwrap().unwrap();
    assert_eq!(handle.resource(), "job-42");
    assert_eq!(store.live_lease("job-42").unwrap().owner, handle.owner());
}

#[tokio::test(start_paused = true)]
async fn acquire_times_out_while_lease_is_live() {
    let (clock, store) = shared_store();
    let a = acquirer(&store, &clock);
    let b = acquirer(&store, &clock);

    let _held = a.try_acquire("job-42", LEASE).await.unwrap().unwrap();

    // The manual clock never advances, so the lease never expires and B's
    // deadline fires.
    let err = b
        .acquire("job-42", LEASE, Some(Duration::from_millis(2_500)))
        .await
        .unwrap_err();
    assert!(matches!(err, LockError::Timeout(_)));
}

#[tokio::test]
async fn handle_reports_remaining_and_expiry() {
    let (clock, store) = shared_store();
    let coordinator = acquirer(&store, &clock);

    let handle = coordinator.try_acquire("job-42", LEASE).await.unwrap().unwrap();
    assert_eq!(handle.remaining(), Duration::from_millis(3_000));
    assert!(!handle.is_expired());

    clock.advance(2_000);
    assert_eq!(handle.remaining(), Duration::from_millis(1_000));

    clock.advance(1_001);
    assert!(handle.is_expired());
    assert_eq!(handle.remaining(), Duration::ZERO);

    // Releasing an expired lease is still safe.
    handle.release().await.unwrap();
}

#[tokio::test]
async fn release_after_steal_keeps_successor_lease() {
    let (clock, store) = shared_store();
    let a = acquirer(&store, &clock);
    let b = acquirer(&store, &clock);

    let first = a.try_acquire("job-42", LEASE).await.unwrap().unwrap();
    clock.advance(3_001);
    let second = b.try_acquire("job-42", LEASE).await.unwrap().unwrap();

    // A's late release must not take down B's live lease.
    first.release().await.unwrap();
    assert_eq!(store.live_lease("job-42").unwrap().owner, second.owner());
}

#[tokio::test(start_paused = true)]
async fn permanent_error_surfaces_within_one_tick() {
    let coordinator = LockCoordinator::new(DenyingLeaseStore);

    let start = Instant::now();
    let err = coordinator
        .acquire("job-42", LEASE, None)
        .await
        .unwrap_err();

    assert!(matches!(err, LockError::Permanent(_)));
    assert!(start.elapsed() < Duration::from_millis(1_000));
}

#[tokio::test(start_paused = true)]
async fn transient_errors_recover_within_budget() {
    let coordinator = LockCoordinator::builder(FlakyLeaseStore::new(2))
        .backoff(BackoffPolicy::fixed(Duration::from_millis(100)))
        .build();

    let handle = coordinator.acquire("job-42", LEASE, None).await;
    assert!(handle.is_ok());
}

#[tokio::test(start_paused = true)]
async fn transient_errors_beyond_budget_surface() {
    let coordinator = LockCoordinator::builder(FlakyLeaseStore::new(10))
        .backoff(BackoffPolicy::fixed(Duration::from_millis(100)))
        .transient_retry_limit(3)
        .build();

    let err = coordinator
        .acquire("job-42", LEASE, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LockError::Transient(_)));
}
