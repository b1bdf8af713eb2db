//! Domain error taxonomy surfaced to the UI shell.

use crate::db::RepositoryError;
use crate::models::BarberId;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by the service layer.
///
/// Every variant is local and recoverable by user retry; there is no fatal
/// class. Validation failures reject the mutation before any state change.
/// A persistence failure during save leaves the in-memory session unchanged
/// and dirty; retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or out-of-domain input (bad weekday, Sunday time off, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A replace-all save is already in flight for this barber; mutations
    /// and further saves are rejected until it settles.
    #[error("a save is already in flight for barber {0}")]
    SaveInProgress(BarberId),

    /// The remote store was unreachable or rejected the operation.
    #[error("persistence error: {0}")]
    Persistence(#[source] RepositoryError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<RepositoryError> for ServiceError {
    /// Storage-level "row missing" surfaces as the domain's `NotFound`;
    /// everything else is a persistence failure.
    fn from(err: RepositoryError) -> Self {
        if err.is_not_found() {
            ServiceError::NotFound(err.to_string())
        } else {
            ServiceError::Persistence(err)
        }
    }
}
