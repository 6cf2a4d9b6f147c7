//! Distributed mutual-exclusion locks over conditional-write key-value stores.
//!
//! Multiple independent processes coordinate exclusive access to a named
//! resource without a central lock server. A lease is one row in a shared,
//! strongly-consistent store; a conditional put that succeeds only when no
//! unexpired row exists enforces mutual exclusion, and time-based expiry
//! keeps a crashed holder from deadlocking everyone else.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lease_lock::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a store (example: DynamoDB backend)
//!     let store = DynamoLeaseStore::builder()
//!         .table_name("leases")
//!         .region("us-east-1")
//!         .build()
//!         .await?;
//!
//!     // The coordinator owns the poll/retry/backoff loop
//!     let coordinator = LockCoordinator::new(store);
//!
//!     // Acquire with a 30s lease, waiting up to 10s
//!     let handle = coordinator
//!         .acquire("job-42", Duration::from_secs(30), Some(Duration::from_secs(10)))
//!         .await?;
//!
//!     // Critical section - must finish before the lease expires
//!     println!("Doing critical work...");
//!
//!     // Release explicitly; a dropped handle just lets the lease expire
//!     handle.release().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Hard constraint: lease duration bounds the critical section
//!
//! There is no heartbeat or renewal. Once a lease's `expires_at` passes, a
//! competitor can steal the resource even while the original holder is
//! still working. Pick a lease duration that conservatively upper-bounds
//! the critical section, and check [`LeaseHandle::is_expired`] if work may
//! run long.
//!
//! # Guarantees and non-guarantees
//!
//! - Mutual exclusion: at most one unexpired lease per resource, enforced
//!   by the store's atomic conditional write.
//! - No fairness: waiters poll; whichever conditional write lands first
//!   wins, and a waiter may be delayed arbitrarily under contention.
//! - No reentrancy, no cross-resource deadlock detection.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `lease-lock-core`: error taxonomy, clock, store trait, coordinator
//! - `lease-lock-dynamodb`: DynamoDB backend
//! - `lease-lock-memory`: in-process backend and test double
//!
//! For fine-grained control, depend on individual crates instead.

// Re-export core types and traits
pub use lease_lock_core::*;

// Re-export DynamoDB backend
#[allow(ambiguous_glob_reexports)]
pub use lease_lock_dynamodb::*;

// Re-export memory backend
#[allow(ambiguous_glob_reexports)]
pub use lease_lock_memory::*;
