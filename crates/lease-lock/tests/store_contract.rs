//! Contract tests any `LeaseStore` implementation must satisfy.
//!
//! The same code runs against every backend; the in-memory store runs
//! here, and the DynamoDB backend runs it in `dynamodb_tests.rs` against a
//! live endpoint.

use std::time::Duration;

use lease_lock_core::store::LeaseStore;
use lease_lock_memory::MemoryLeaseStore;

/// Exercises acquire/contend/release/reacquire against one store.
async fn exercise_store<S: LeaseStore>(store: &S, resource: &str) {
    store.ensure_schema().await.unwrap();

    // Fresh resource: first conditional write wins.
    let acquired = store
        .try_acquire(resource, "owner-a", Duration::from_secs(30))
        .await
        .unwrap();
    assert!(acquired);

    // Live lease: second writer is rejected as contention, not an error.
    let acquired = store
        .try_acquire(resource, "owner-b", Duration::from_secs(30))
        .await
        .unwrap();
    assert!(!acquired);

    // Owner-conditioned release frees the resource.
    store.release(resource, "owner-a").await.unwrap();
    let acquired = store
        .try_acquire(resource, "owner-b", Duration::from_secs(30))
        .await
        .unwrap();
    assert!(acquired);

    // Release is idempotent, including for a stale owner.
    store.release(resource, "owner-b").await.unwrap();
    store.release(resource, "owner-b").await.unwrap();
    store.release(resource, "owner-a").await.unwrap();
}

#[tokio::test]
async fn memory_store_satisfies_contract() {
    let store = MemoryLeaseStore::new();
    exercise_store(&store, "contract-resource").await;
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let store = MemoryLeaseStore::new();
    store.ensure_schema().await.unwrap();
    store.ensure_schema().await.unwrap();
}
