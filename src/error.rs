//! Error taxonomy for the learning core.
//!
//! Feedback validation and persistence failures surface to the caller;
//! everything raised inside the retraining pipeline is absorbed at the
//! pipeline boundary and downgraded to a logged outcome.

use thiserror::Error;

/// Errors produced by the continuous-learning core.
#[derive(Debug, Error)]
pub enum LearningError {
    /// Malformed feedback input, rejected at the store boundary.
    #[error("invalid feedback: {0}")]
    Validation(String),

    /// Not enough feedback to train a candidate model.
    #[error("insufficient training data: {available} entries, need {required}")]
    InsufficientData { available: usize, required: usize },

    /// Degenerate held-out split; the cycle aborts without touching the registry.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Storage failure that would otherwise leave partial state.
    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unknown model version id.
    #[error("model version not found: {0}")]
    NotFound(String),
}

/// Convenience alias used throughout the core modules.
pub type Result<T> = std::result::Result<T, LearningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = LearningError::InsufficientData {
            available: 42,
            required: 100,
        };
        assert_eq!(
            err.to_string(),
            "insufficient training data: 42 entries, need 100"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LearningError = io.into();
        assert!(matches!(err, LearningError::Io(_)));
    }
}
