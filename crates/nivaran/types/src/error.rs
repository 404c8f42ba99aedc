//! Shared routing-domain error taxonomy.

use crate::IssueStatus;
use thiserror::Error;

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Errors surfaced by the routing core.
///
/// Notification delivery failures are *not* represented here: they are
/// logged and swallowed inside the fan-out engine and never propagate to
/// the caller of an issue-side operation.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Malformed submission or request (missing required fields,
    /// ownership mismatch).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A status-machine precondition was violated; the issue is left
    /// unmodified.
    #[error("invalid transition: cannot {action} an issue in status {from:?}")]
    InvalidTransition {
        from: IssueStatus,
        action: &'static str,
    },

    /// A referenced region/department/user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A department name matched more than one department across regions
    /// during reconciliation; binding is refused rather than guessed.
    #[error("department name '{name}' is ambiguous: {matches} candidates across regions")]
    ResolutionAmbiguous { name: String, matches: usize },

    /// Storage-layer failure, including lost conditional-write races.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RoutingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        RoutingError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        RoutingError::NotFound(msg.into())
    }
}
