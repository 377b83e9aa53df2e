//! Expression evaluator
//!
//! Public entry point of the engine. Each call owns a fresh session, so
//! concurrent evaluations never share cache or in-progress state.

use tracing::debug;

use varex_domain::{ArgumentContext, EvaluationError, ResolvedVariable, VariableMap};

use super::engine::Resolver;
use super::normalizer::normalize;
use crate::ports::{HelperApi, ScriptRuntime};

/// Result of one evaluation, with the variables it pulled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The final string.
    pub value: String,

    /// Variables resolved during the call, in completion order.
    pub resolved: Vec<ResolvedVariable>,
}

/// Evaluates expressions against a variable map and runtime arguments.
#[derive(Debug, Clone, Default)]
pub struct ExpressionEvaluator<R> {
    runtime: R,
}

impl<R: ScriptRuntime> ExpressionEvaluator<R> {
    /// Creates an evaluator that executes code with `runtime`.
    pub const fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Evaluates `source` and returns its string result.
    ///
    /// `helpers` is forwarded unchanged to every execution as `api`.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable`, `UndefinedArgument`, `CircularReference`,
    /// or `Runtime` for anything the expression code raised.
    pub async fn evaluate(
        &self,
        variables: &VariableMap,
        arguments: &ArgumentContext,
        helpers: &dyn HelperApi,
        source: &str,
    ) -> Result<String, EvaluationError> {
        self.evaluate_with_trace(variables, arguments, helpers, source)
            .await
            .map(|evaluation| evaluation.value)
    }

    /// Evaluates `source` and also reports every variable it resolved.
    ///
    /// # Errors
    ///
    /// Same as [`ExpressionEvaluator::evaluate`].
    pub async fn evaluate_with_trace(
        &self,
        variables: &VariableMap,
        arguments: &ArgumentContext,
        helpers: &dyn HelperApi,
        source: &str,
    ) -> Result<Evaluation, EvaluationError> {
        debug!(
            variables = variables.len(),
            arguments = arguments.len(),
            "evaluating expression"
        );

        let resolver = Resolver::new(variables, arguments, &self.runtime, helpers);
        let body = normalize(source);
        let value = resolver.execute(&body, None).await?;

        Ok(Evaluation {
            value: value.to_display_string(),
            resolved: resolver.into_session().into_resolved(),
        })
    }

    /// Resolves a single stored variable, as if evaluating `vars[name]`.
    ///
    /// Works for names that are not valid identifiers.
    ///
    /// # Errors
    ///
    /// Same as [`ExpressionEvaluator::evaluate`].
    pub async fn resolve_variable(
        &self,
        variables: &VariableMap,
        arguments: &ArgumentContext,
        helpers: &dyn HelperApi,
        name: &str,
    ) -> Result<String, EvaluationError> {
        self.resolve_variable_with_trace(variables, arguments, helpers, name)
            .await
            .map(|evaluation| evaluation.value)
    }

    /// Resolves a single stored variable and reports what it pulled in.
    ///
    /// # Errors
    ///
    /// Same as [`ExpressionEvaluator::evaluate`].
    pub async fn resolve_variable_with_trace(
        &self,
        variables: &VariableMap,
        arguments: &ArgumentContext,
        helpers: &dyn HelperApi,
        name: &str,
    ) -> Result<Evaluation, EvaluationError> {
        debug!(variable = name, "resolving stored variable");

        let resolver = Resolver::new(variables, arguments, &self.runtime, helpers);
        let value = resolver.resolve(name, name).await?;

        Ok(Evaluation {
            value,
            resolved: resolver.into_session().into_resolved(),
        })
    }
}
