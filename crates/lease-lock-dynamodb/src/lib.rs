//! DynamoDB backend for lease-based distributed locks.
//!
//! Leases live in one table keyed by `resource`, with `expires_at` (epoch
//! millis) and `owner` as plain attributes. Mutual exclusion rests entirely
//! on DynamoDB evaluating the `PutItem` condition expression and the write
//! as one atomic unit; the adapter never reads before writing.

pub mod builder;
pub mod classify;
pub mod schema;
pub mod store;

pub use builder::DynamoLeaseStoreBuilder;
pub use store::DynamoLeaseStore;
