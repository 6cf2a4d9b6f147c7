//! SDK error classification.
//!
//! The coordinator only ever retries [`LockError::Transient`]; everything
//! that cannot heal on its own (auth, validation, missing table) must map
//! to [`LockError::Permanent`] so acquisition aborts instead of silently
//! polling forever.

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use lease_lock_core::error::LockError;

/// Service error codes worth retrying.
const TRANSIENT_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
    "InternalServerError",
    "ServiceUnavailable",
];

/// Whether a `PutItem` failure is a rejected condition (contention), as
/// opposed to a real error.
pub(crate) fn is_put_conditional_check_failed(err: &SdkError<PutItemError>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => matches!(
            service_err.err(),
            PutItemError::ConditionalCheckFailedException(_)
        ),
        _ => false,
    }
}

/// Whether a `DeleteItem` failure is a rejected condition (owner mismatch).
pub(crate) fn is_delete_conditional_check_failed(err: &SdkError<DeleteItemError>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => matches!(
            service_err.err(),
            DeleteItemError::ConditionalCheckFailedException(_)
        ),
        _ => false,
    }
}

/// Maps an SDK failure to the transient/permanent taxonomy.
///
/// Dispatch failures, request timeouts and malformed responses are network
/// class problems and retryable; service errors are split on their error
/// code.
pub(crate) fn classify_sdk_error<E>(err: SdkError<E>) -> LockError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let transient = match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) | SdkError::ResponseError(_) => {
            true
        }
        SdkError::ServiceError(service_err) => {
            let code = service_err.err().code().unwrap_or_default();
            TRANSIENT_CODES.contains(&code)
        }
        _ => false,
    };

    if transient {
        LockError::Transient(Box::new(err))
    } else {
        LockError::Permanent(Box::new(err))
    }
}
