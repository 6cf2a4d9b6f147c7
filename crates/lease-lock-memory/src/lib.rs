//! In-process reference store for lease-based distributed locks.
//!
//! Implements the exact conditional-write semantics of the DynamoDB backend
//! against a `HashMap` behind a mutex, parameterized by the core clock
//! abstraction. Useful as a single-process backend and as a deterministic
//! test double: pair it with [`ManualClock`](lease_lock_core::ManualClock)
//! to drive lease expiry without sleeping.

pub mod store;

pub use store::MemoryLeaseStore;
