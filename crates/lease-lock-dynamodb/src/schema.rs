//! Table layout and condition expressions.

/// Partition key: the lock's resource name.
pub const ATTR_RESOURCE: &str = "resource";

/// Epoch millis at which the lease becomes invalid.
pub const ATTR_EXPIRES_AT: &str = "expires_at";

/// Token of the acquirer that won the conditional write.
pub const ATTR_OWNER: &str = "owner";

/// Acquire condition: the resource has no row, or its lease has expired.
///
/// Expired rows are treated as absent rather than garbage-collected, so
/// the winning put simply overwrites them.
pub(crate) const ACQUIRE_CONDITION: &str = "attribute_not_exists(#r) OR #e < :now";

/// Release condition: the row is already gone, or we still own it.
///
/// Prevents a holder whose lease expired from deleting a successor's live
/// lease.
pub(crate) const RELEASE_CONDITION: &str = "attribute_not_exists(#r) OR #o = :owner";
