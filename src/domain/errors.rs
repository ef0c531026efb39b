//! Domain errors for the order service.

use thiserror::Error;

/// Domain-level errors that can occur along the ingestion pipeline.
///
/// A lookup for an unknown order is not an error: read paths return `Option`.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A stream payload could not be turned into a valid order.
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// The store was unreachable or rejected a read or write.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The cache could not be populated from the store at start-up.
    #[error("Cache warm-up failed: {0}")]
    WarmUpFailure(String),

    /// Transient read error reported by the stream client.
    #[error("Stream failure: {0}")]
    StreamFailure(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition { from: String, to: String, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether this error belongs to the store side of the pipeline.
    #[cfg(test)]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::PersistenceFailure(_))
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::PersistenceFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_errors_are_persistence_failures() {
        let err: DomainError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_persistence());
        assert!(err.to_string().starts_with("Persistence failure"));
    }

    #[test]
    fn test_state_transition_message() {
        let err = DomainError::InvalidStateTransition {
            from: "cold".to_string(),
            to: "warm".to_string(),
            reason: "cache is already warm".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition from cold to warm: cache is already warm"
        );
        assert!(!err.is_persistence());
    }
}
