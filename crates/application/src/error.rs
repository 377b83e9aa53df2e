//! Application error types

use thiserror::Error;
use varex_domain::EvaluationError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The expression failed to evaluate.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// The variable definitions could not be loaded.
    #[error("storage error: {0}")]
    Storage(String),

    /// The evaluation did not finish within the configured time.
    #[error("operation timed out")]
    Timeout,
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
