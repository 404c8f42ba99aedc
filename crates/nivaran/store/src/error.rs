//! Storage-layer errors and the bridge into the routing taxonomy.

use nivaran_types::RoutingError;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    /// A conditional write found the record in an unexpected state.
    /// Lost races surface here and degrade to no-ops at the caller.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for RoutingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => RoutingError::NotFound(msg),
            StoreError::Conflict(msg) | StoreError::Backend(msg) => RoutingError::Storage(msg),
        }
    }
}
