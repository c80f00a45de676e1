//! Domain errors - error taxonomy for the room engine

use thiserror::Error;

/// Domain layer errors
///
/// Failures are always local to one session's operation; nothing here may
/// corrupt another session's view of room state.
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation
    // =========================================================================
    #[error("Message body too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Message body is empty")]
    EmptyBody,

    // =========================================================================
    // Infrastructure
    // =========================================================================
    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Registry is shutting down, no new joins accepted")]
    RegistryClosed,
}

impl DomainError {
    /// True when the persistence layer failed and nothing may be broadcast
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
