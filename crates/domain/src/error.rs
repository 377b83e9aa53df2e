//! Domain error types

use thiserror::Error;

/// Errors surfaced by one evaluation call.
///
/// The set is closed: every failure of `evaluate()` is one of these four kinds.
/// None of them is retried; the first one raised rejects the whole call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// The accessed variable name has no definition in the variable map.
    #[error("variable '{0}' is not defined")]
    UndefinedVariable(String),

    /// The expression read an argument key absent from the argument context.
    #[error("argument '{0}' is not defined")]
    UndefinedArgument(String),

    /// Resolution re-entered a variable that was already being resolved.
    /// Carries the root name that started the chain, not the innermost one.
    #[error("circular reference detected while resolving '{0}'")]
    CircularReference(String),

    /// Any other failure raised while executing user-authored code.
    #[error("{0}")]
    Runtime(String),
}

impl EvaluationError {
    /// Creates a runtime error of the given class, e.g. `TypeError`.
    #[must_use]
    pub fn runtime(class: &str, message: impl std::fmt::Display) -> Self {
        Self::Runtime(format!("{class}: {message}"))
    }

    /// Shorthand for `ReferenceError: <name> is not defined`.
    #[must_use]
    pub fn unbound_identifier(name: &str) -> Self {
        Self::runtime("ReferenceError", format_args!("{name} is not defined"))
    }

    /// Shorthand for a `TypeError`.
    #[must_use]
    pub fn type_error(message: impl std::fmt::Display) -> Self {
        Self::runtime("TypeError", message)
    }

    /// The error raised when resolution or nesting runs too deep.
    #[must_use]
    pub fn stack_overflow() -> Self {
        Self::runtime("RangeError", "Maximum call stack size exceeded")
    }
}

/// Result type alias for evaluation operations.
pub type EvaluationResult<T> = Result<T, EvaluationError>;
