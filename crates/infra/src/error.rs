use thiserror::Error;

use quotedesk_auth::AuthError;
use quotedesk_core::DomainError;

/// Persistence failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The allocated document number is already taken (racing allocation or
    /// legacy data ahead of the counter). Safe to retry.
    #[error("document number already taken: {0}")]
    DuplicateNumber(String),

    /// The record changed or disappeared since it was read.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A uniqueness rule other than the document number was violated.
    #[error("duplicate entry: {0}")]
    Duplicate(String),

    /// Stored data cannot be interpreted.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        StoreError::Backend("lock poisoned".to_string())
    }
}

/// Failure of an application service operation.
///
/// Deterministic domain failures keep their own variants so the HTTP layer
/// can map them to status codes; everything else is `Store`/`Internal`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("not found")]
    NotFound,

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Write lost a race that retrying with the same input cannot win.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Store(StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ServiceError::Validation(msg)
            }
            DomainError::InvariantViolation(msg) => ServiceError::InvariantViolation(msg),
            DomainError::NotFound => ServiceError::NotFound,
            DomainError::Forbidden(msg) => ServiceError::Forbidden(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::Unauthorized => ServiceError::Unauthorized,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) | StoreError::Duplicate(msg) => {
                ServiceError::Conflict(msg)
            }
            other => ServiceError::Store(other),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Validation(msg) => ServiceError::Validation(msg),
            AuthError::InvalidCredentials | AuthError::Token(_) => ServiceError::Unauthorized,
            AuthError::Hashing(msg) | AuthError::Signing(msg) => ServiceError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_number_stays_a_store_error() {
        let err = ServiceError::from(StoreError::DuplicateNumber("QT-2026-0001".into()));
        assert!(matches!(err, ServiceError::Store(StoreError::DuplicateNumber(_))));
    }

    #[test]
    fn stale_writes_and_duplicates_are_conflicts() {
        assert!(matches!(
            ServiceError::from(StoreError::Concurrency("v".into())),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Duplicate("kitchen".into())),
            ServiceError::Conflict(_)
        ));
    }

    #[test]
    fn invalid_ids_are_validation_failures() {
        assert_eq!(
            ServiceError::from(DomainError::invalid_id("bad")),
            ServiceError::Validation("bad".into())
        );
    }
}
