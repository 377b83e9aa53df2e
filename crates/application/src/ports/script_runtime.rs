//! Scripting runtime port
//!
//! The engine never interprets source itself. It hands a normalized function
//! body to a `ScriptRuntime` together with the three parameters every
//! expression runs with: the variables accessor, the arguments accessor and
//! the helper namespace.

use async_trait::async_trait;
use varex_domain::{EvaluationError, ScriptValue};

use super::helper_api::HelperApi;

/// Lazy, pull-based access to other variables (`vars` in expression code).
///
/// Every read may trigger resolution of the named variable, so it can suspend
/// and can fail with any of the engine's errors.
#[async_trait]
pub trait VariableAccessor: Send + Sync {
    /// Resolves the named variable.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable`, `CircularReference`, or whatever the
    /// referenced expression raised while executing.
    async fn get(&self, name: &str) -> Result<String, EvaluationError>;
}

/// Read-only access to the runtime arguments (`args` in expression code).
pub trait ArgumentAccessor: Send + Sync {
    /// Returns the named argument.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedArgument` if the key is absent.
    fn get(&self, name: &str) -> Result<ScriptValue, EvaluationError>;
}

/// The parameters an expression body is executed with.
#[derive(Clone, Copy)]
pub struct ScriptScope<'a> {
    /// Exposed to scripts as `vars`.
    pub variables: &'a dyn VariableAccessor,
    /// Exposed to scripts as `args`.
    pub arguments: &'a dyn ArgumentAccessor,
    /// Exposed to scripts as `api`, forwarded unchanged from the caller.
    pub helpers: &'a dyn HelperApi,
}

impl std::fmt::Debug for ScriptScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptScope").finish_non_exhaustive()
    }
}

/// An embedded scripting capability able to run expression bodies.
#[async_trait]
pub trait ScriptRuntime: Send + Sync {
    /// Executes a normalized function body and returns its result.
    ///
    /// Errors raised by the accessors must be returned unchanged. Every other
    /// failure, including syntax errors, is reported as
    /// `EvaluationError::Runtime`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body fails to parse or raises while running.
    async fn execute<'a>(
        &'a self,
        body: &'a str,
        scope: ScriptScope<'a>,
    ) -> Result<ScriptValue, EvaluationError>;
}
