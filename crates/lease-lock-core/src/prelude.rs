//! Convenience prelude for lease lock types.

pub use crate::backoff::BackoffPolicy;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::coordinator::{LockCoordinator, LockCoordinatorBuilder};
pub use crate::error::{LockError, LockResult};
pub use crate::handle::LeaseHandle;
pub use crate::lease::{Lease, create_owner_token};
pub use crate::store::LeaseStore;
pub use crate::timeout::{Timeout, TimeoutValue};
