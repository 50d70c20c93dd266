use thiserror::Error;

/// Unified error type for the common-expense core.
///
/// Every failure is local and synchronous; nothing here is fatal to the
/// process and callers treat each kind as recoverable per request.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or out-of-range input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Access-policy denial. Deliberately carries no detail so a denied
    /// lookup is indistinguishable from a denied existing entity.
    #[error("Not accessible")]
    Forbidden,
    /// Referenced entity absent. Only surfaced to already-authorized callers.
    #[error("Not found: {0}")]
    NotFound(String),
    /// A record contradicts the rest of the snapshot (dangling or inactive
    /// reference). Surfaced, never silently skipped.
    #[error("Inconsistent record: {0}")]
    Inconsistent(String),
    /// Failure at the persistence boundary (I/O or serialization). Never
    /// produced by the pure computations.
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}
