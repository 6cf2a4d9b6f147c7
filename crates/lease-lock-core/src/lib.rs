//! Core traits and acquisition protocol for lease-based distributed locks.

pub mod backoff;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod handle;
pub mod lease;
pub mod prelude;
pub mod store;
pub mod timeout;

pub use error::{LockError, LockResult};
pub use prelude::*;
