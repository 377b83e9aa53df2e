//! Evaluate expression use case.
//!
//! The embedding side of the engine: loads the effective variable map, runs
//! one evaluation and bounds it with the configured timeout.

use tracing::{info, warn};

use varex_domain::{
    ArgumentContext, EngineSettings, EvaluationError, ResolvedVariable, VariableMap,
};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{HelperApi, ScriptRuntime, VariableStore};
use crate::variable_resolver::{Evaluation, ExpressionEvaluator};

/// What to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationTarget {
    /// A root expression source.
    Source(String),
    /// A stored variable, by name.
    Variable(String),
}

/// Input for one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluateExpressionInput {
    /// The expression or variable to evaluate.
    pub target: EvaluationTarget,
    /// Runtime arguments for this call.
    pub arguments: ArgumentContext,
}

impl EvaluateExpressionInput {
    /// Input evaluating a root expression source.
    #[must_use]
    pub fn source(source: impl Into<String>, arguments: ArgumentContext) -> Self {
        Self {
            target: EvaluationTarget::Source(source.into()),
            arguments,
        }
    }

    /// Input resolving a stored variable.
    #[must_use]
    pub fn variable(name: impl Into<String>, arguments: ArgumentContext) -> Self {
        Self {
            target: EvaluationTarget::Variable(name.into()),
            arguments,
        }
    }
}

/// Output of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluateExpressionOutput {
    /// The evaluated string.
    pub value: String,
    /// Variables resolved along the way; empty unless tracing is enabled.
    pub resolved: Vec<ResolvedVariable>,
}

/// Use case evaluating expressions against a variable store.
pub struct EvaluateExpression<S, R, H> {
    store: S,
    evaluator: ExpressionEvaluator<R>,
    helpers: H,
    settings: EngineSettings,
}

impl<S, R, H> EvaluateExpression<S, R, H>
where
    S: VariableStore,
    R: ScriptRuntime,
    H: HelperApi,
{
    /// Creates a new `EvaluateExpression` use case.
    pub const fn new(store: S, runtime: R, helpers: H, settings: EngineSettings) -> Self {
        Self {
            store,
            evaluator: ExpressionEvaluator::new(runtime),
            helpers,
            settings,
        }
    }

    /// Returns the settings in effect.
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// - `Storage` if the variable map cannot be loaded
    /// - `Evaluation` if the expression fails
    /// - `Timeout` if the configured time limit is exceeded
    pub async fn execute(
        &self,
        input: EvaluateExpressionInput,
    ) -> ApplicationResult<EvaluateExpressionOutput> {
        let variables = self
            .store
            .load()
            .await
            .map_err(|e| ApplicationError::Storage(e.to_string()))?;

        let run = self.run(&variables, &input);
        let evaluation = match self.settings.timeout() {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                warn!(timeout_ms = limit.as_millis(), "evaluation timed out");
                ApplicationError::Timeout
            })??,
            None => run.await?,
        };

        info!(
            resolved = evaluation.resolved.len(),
            "expression evaluated"
        );

        Ok(EvaluateExpressionOutput {
            value: evaluation.value,
            resolved: if self.settings.trace {
                evaluation.resolved
            } else {
                Vec::new()
            },
        })
    }

    async fn run(
        &self,
        variables: &VariableMap,
        input: &EvaluateExpressionInput,
    ) -> Result<Evaluation, EvaluationError> {
        match &input.target {
            EvaluationTarget::Source(source) => {
                self.evaluator
                    .evaluate_with_trace(variables, &input.arguments, &self.helpers, source)
                    .await
            }
            EvaluationTarget::Variable(name) => {
                self.evaluator
                    .resolve_variable_with_trace(variables, &input.arguments, &self.helpers, name)
                    .await
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ports::{NoHelpers, ScriptScope, StaticVariableStore, VariableStoreError};
    use crate::variable_resolver::testing::ConcatRuntime;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use varex_domain::{ScriptValue, VariableDefinition};

    struct FailingStore;

    #[async_trait]
    impl VariableStore for FailingStore {
        async fn load(&self) -> Result<VariableMap, VariableStoreError> {
            Err(VariableStoreError::NotFound("variables.json".to_string()))
        }
    }

    struct StalledRuntime;

    #[async_trait]
    impl ScriptRuntime for StalledRuntime {
        async fn execute<'a>(
            &'a self,
            _body: &'a str,
            _scope: ScriptScope<'a>,
        ) -> Result<ScriptValue, EvaluationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ScriptValue::Undefined)
        }
    }

    fn store() -> StaticVariableStore {
        let mut variables = VariableMap::new();
        variables.insert(
            "BASE_URL".to_string(),
            VariableDefinition::constant("https://example.com"),
        );
        variables.insert(
            "TASKS".to_string(),
            VariableDefinition::expression("vars.BASE_URL + '/tasks'"),
        );
        StaticVariableStore::new(variables)
    }

    #[tokio::test]
    async fn test_evaluate_source() {
        let use_case =
            EvaluateExpression::new(store(), ConcatRuntime, NoHelpers, EngineSettings::default());

        let output = use_case
            .execute(EvaluateExpressionInput::source(
                "vars.TASKS + '?all'",
                ArgumentContext::new(),
            ))
            .await
            .unwrap();

        assert_eq!(output.value, "https://example.com/tasks?all");
        assert!(output.resolved.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_variable_with_trace() {
        let settings = EngineSettings::default().with_trace(true);
        let use_case = EvaluateExpression::new(store(), ConcatRuntime, NoHelpers, settings);

        let output = use_case
            .execute(EvaluateExpressionInput::variable("TASKS", ArgumentContext::new()))
            .await
            .unwrap();

        assert_eq!(output.value, "https://example.com/tasks");
        let names: Vec<_> = output.resolved.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["BASE_URL", "TASKS"]);
    }

    #[tokio::test]
    async fn test_storage_failure() {
        let use_case =
            EvaluateExpression::new(FailingStore, ConcatRuntime, NoHelpers, EngineSettings::default());

        let result = use_case
            .execute(EvaluateExpressionInput::source("'x'", ArgumentContext::new()))
            .await;

        assert!(matches!(result, Err(ApplicationError::Storage(_))));
    }

    #[tokio::test]
    async fn test_evaluation_error_is_forwarded() {
        let use_case =
            EvaluateExpression::new(store(), ConcatRuntime, NoHelpers, EngineSettings::default());

        let result = use_case
            .execute(EvaluateExpressionInput::source("args.user", ArgumentContext::new()))
            .await;

        match result {
            Err(ApplicationError::Evaluation(err)) => {
                assert_eq!(err, EvaluationError::UndefinedArgument("user".to_string()));
            }
            other => panic!("expected evaluation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let settings = EngineSettings::default().with_timeout_ms(Some(10));
        let use_case = EvaluateExpression::new(store(), StalledRuntime, NoHelpers, settings);

        let result = use_case
            .execute(EvaluateExpressionInput::source("'x'", ArgumentContext::new()))
            .await;

        assert!(matches!(result, Err(ApplicationError::Timeout)));
    }
}
