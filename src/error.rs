//! Error types for deckgen.
//!
//! All errors in deckgen are strongly typed using thiserror.
//! Only a handful of conditions abort a deck build; everything the
//! generator can recover from (malformed colors, missing basic lands,
//! under-filled categories) is handled locally and never shows up here.

use thiserror::Error;

use crate::card::CardId;
use crate::storage::RepositoryError;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("max_price must be a finite, non-negative number (got {value})")]
    InvalidMaxPrice {
        value: f64,
    },

    #[error("Commander id cannot be empty")]
    EmptyCommanderId,

    #[error("Search term cannot be empty")]
    EmptySearchTerm,

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        field: String,
        max_length: usize,
    },

    #[error("Invalid allocation config: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Execution errors that occur while building a deck or serving a lookup.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Commander not found: {id}")]
    CommanderNotFound {
        id: CardId,
    },

    #[error("Card not found: {id}")]
    CardNotFound {
        id: CardId,
    },

    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Build queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Build worker disconnected")]
    Disconnected,

    #[error("Storage error: {message}")]
    Storage {
        message: String,
    },
}

/// Top-level error type for deckgen.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl From<RepositoryError> for DeckError {
    fn from(err: RepositoryError) -> Self {
        Self::Execution(ExecutionError::Storage {
            message: err.to_string(),
        })
    }
}

impl DeckError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if the requested commander or card does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Execution(
                ExecutionError::CommanderNotFound { .. } | ExecutionError::CardNotFound { .. }
            )
        )
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Execution(e) => matches!(
                e,
                ExecutionError::Timeout { .. } | ExecutionError::QueueFull { .. }
            ),
            Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for deckgen operations.
pub type DeckResult<T> = Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_max_price() {
        let err = ValidationError::InvalidMaxPrice { value: -3.5 };
        let msg = format!("{err}");
        assert!(msg.contains("-3.5"));
        assert!(msg.contains("non-negative"));
    }

    #[test]
    fn test_execution_error_commander_not_found() {
        let err = ExecutionError::CommanderNotFound {
            id: CardId::new("missing-id"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Commander not found"));
        assert!(msg.contains("missing-id"));
    }

    #[test]
    fn test_execution_error_timeout() {
        let err = ExecutionError::Timeout { duration_ms: 5000 };
        let msg = format!("{err}");
        assert!(msg.contains("5000ms"));
    }

    #[test]
    fn test_deck_error_from_validation() {
        let err: DeckError = ValidationError::EmptyCommanderId.into();
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_deck_error_not_found() {
        let err: DeckError = ExecutionError::CommanderNotFound {
            id: CardId::new("x"),
        }
        .into();
        assert!(err.is_execution());
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_deck_error_from_repository() {
        let err: DeckError = RepositoryError::BackendError("disk gone".to_string()).into();
        let DeckError::Execution(ExecutionError::Storage { message }) = &err else {
            panic!("expected storage error, got {err:?}");
        };
        assert!(message.contains("disk gone"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_deck_error_retryable() {
        let err1: DeckError = ValidationError::EmptySearchTerm.into();
        assert!(!err1.is_retryable());

        let err2: DeckError = ExecutionError::Timeout { duration_ms: 100 }.into();
        assert!(err2.is_retryable());

        let err3: DeckError = ExecutionError::QueueFull { capacity: 4 }.into();
        assert!(err3.is_retryable());

        let err4 = DeckError::internal("unexpected state");
        assert!(err4.is_internal());
        assert!(!err4.is_retryable());
    }
}
