//! Variable resolution engine
//!
//! Resolves variables lazily against one shared `EvaluationSession`. Reading
//! `vars.X` from expression code calls back into `Resolver::resolve`, which
//! memoizes the result and refuses to re-enter a name that is still being
//! resolved.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use varex_domain::{ArgumentContext, EvaluationError, ScriptValue, VariableKind, VariableMap};

use super::normalizer::normalize;
use super::session::EvaluationSession;
use crate::ports::{ArgumentAccessor, HelperApi, ScriptRuntime, ScriptScope, VariableAccessor};

/// Maximum number of variables resolved inside one another.
pub const MAX_RESOLUTION_DEPTH: usize = 32;

/// Resolution state for one evaluation call.
///
/// The session lock is only taken for bookkeeping and is never held across an
/// `.await`.
pub(crate) struct Resolver<'a> {
    variables: &'a VariableMap,
    arguments: &'a ArgumentContext,
    runtime: &'a dyn ScriptRuntime,
    helpers: &'a dyn HelperApi,
    session: Mutex<EvaluationSession>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        variables: &'a VariableMap,
        arguments: &'a ArgumentContext,
        runtime: &'a dyn ScriptRuntime,
        helpers: &'a dyn HelperApi,
    ) -> Self {
        Self {
            variables,
            arguments,
            runtime,
            helpers,
            session: Mutex::new(EvaluationSession::new()),
        }
    }

    /// Resolves `name`, reporting cycles against `root`.
    pub(crate) fn resolve<'s>(
        &'s self,
        name: &'s str,
        root: &'s str,
    ) -> BoxFuture<'s, Result<String, EvaluationError>> {
        Box::pin(async move {
            {
                let session = self.session.lock();
                if session.is_in_progress(name) {
                    warn!(variable = name, root, "circular variable reference");
                    return Err(EvaluationError::CircularReference(root.to_string()));
                }
                if let Some(value) = session.cached(name) {
                    trace!(variable = name, "variable cache hit");
                    return Ok(value.to_string());
                }
            }

            let definition = self
                .variables
                .get(name)
                .ok_or_else(|| EvaluationError::UndefinedVariable(name.to_string()))?;

            {
                let mut session = self.session.lock();
                if session.depth() >= MAX_RESOLUTION_DEPTH {
                    warn!(variable = name, root, "variable resolution too deep");
                    return Err(EvaluationError::stack_overflow());
                }
                session.begin(name);
            }

            let value = match definition.kind {
                VariableKind::Constant => definition.value.clone(),
                VariableKind::Expression => {
                    let body = normalize(&definition.value);
                    self.execute(&body, Some(root)).await?.to_display_string()
                }
            };

            debug!(
                variable = name,
                root,
                kind = definition.kind.as_str(),
                "resolved variable"
            );
            self.session
                .lock()
                .finish(name, definition.kind, value.clone());
            Ok(value)
        })
    }

    /// Runs a normalized body with accessors bound to this resolver.
    ///
    /// `root` is `None` for the top-level expression: each variable it reads
    /// then becomes the root of its own resolution chain.
    pub(crate) async fn execute(
        &self,
        body: &str,
        root: Option<&str>,
    ) -> Result<ScriptValue, EvaluationError> {
        let variables = Variables {
            resolver: self,
            root,
        };
        let arguments = Arguments {
            context: self.arguments,
        };
        let scope = ScriptScope {
            variables: &variables,
            arguments: &arguments,
            helpers: self.helpers,
        };

        self.runtime.execute(body, scope).await
    }

    pub(crate) fn into_session(self) -> EvaluationSession {
        self.session.into_inner()
    }
}

/// The `vars` accessor handed to expression code.
struct Variables<'r, 'a> {
    resolver: &'r Resolver<'a>,
    root: Option<&'r str>,
}

#[async_trait::async_trait]
impl<'r, 'a> VariableAccessor for Variables<'r, 'a> {
    async fn get(&self, name: &str) -> Result<String, EvaluationError> {
        let root = self.root.unwrap_or(name);
        self.resolver.resolve(name, root).await
    }
}

/// The `args` accessor handed to expression code.
struct Arguments<'a> {
    context: &'a ArgumentContext,
}

impl ArgumentAccessor for Arguments<'_> {
    fn get(&self, name: &str) -> Result<ScriptValue, EvaluationError> {
        self.context
            .get(name)
            .map(ScriptValue::from)
            .ok_or_else(|| EvaluationError::UndefinedArgument(name.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::variable_resolver::testing::ConcatRuntime;
    use crate::ports::NoHelpers;
    use pretty_assertions::assert_eq;
    use varex_domain::VariableDefinition;

    fn variables(entries: &[(&str, VariableDefinition)]) -> VariableMap {
        entries
            .iter()
            .map(|(name, def)| ((*name).to_string(), def.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_constant_is_taken_verbatim() {
        let vars = variables(&[("RAW", VariableDefinition::constant("vars.NOT_CODE"))]);
        let args = ArgumentContext::new();
        let resolver = Resolver::new(&vars, &args, &ConcatRuntime, &NoHelpers);

        let value = resolver.resolve("RAW", "RAW").await.unwrap();
        assert_eq!(value, "vars.NOT_CODE");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_definition_lookup() {
        let vars = variables(&[("A", VariableDefinition::constant("a"))]);
        let args = ArgumentContext::new();
        let resolver = Resolver::new(&vars, &args, &ConcatRuntime, &NoHelpers);

        resolver.resolve("A", "A").await.unwrap();
        let session = resolver.into_session();
        assert_eq!(session.cached("A"), Some("a"));
        assert_eq!(session.depth(), 0);
    }

    #[tokio::test]
    async fn test_in_progress_name_reports_root() {
        let vars = variables(&[("A", VariableDefinition::constant("a"))]);
        let args = ArgumentContext::new();
        let resolver = Resolver::new(&vars, &args, &ConcatRuntime, &NoHelpers);
        resolver.session.lock().begin("A");

        let err = resolver.resolve("A", "ROOT").await.unwrap_err();
        assert_eq!(err, EvaluationError::CircularReference("ROOT".to_string()));
    }

    #[tokio::test]
    async fn test_nested_reads_keep_the_root() {
        let vars = variables(&[
            ("A", VariableDefinition::expression("vars.B")),
            ("B", VariableDefinition::expression("vars.C")),
            ("C", VariableDefinition::expression("vars.B")),
        ]);
        let args = ArgumentContext::new();
        let resolver = Resolver::new(&vars, &args, &ConcatRuntime, &NoHelpers);

        let err = resolver.resolve("A", "A").await.unwrap_err();
        assert_eq!(err, EvaluationError::CircularReference("A".to_string()));
    }

    fn chain(length: usize) -> VariableMap {
        (0..length)
            .map(|i| {
                let definition = if i == 0 {
                    VariableDefinition::constant("x")
                } else {
                    VariableDefinition::expression(format!("vars.V{}", i - 1))
                };
                (format!("V{i}"), definition)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_chain_within_depth_limit_resolves() {
        let vars = chain(MAX_RESOLUTION_DEPTH);
        let args = ArgumentContext::new();
        let resolver = Resolver::new(&vars, &args, &ConcatRuntime, &NoHelpers);

        let last = format!("V{}", MAX_RESOLUTION_DEPTH - 1);
        assert_eq!(resolver.resolve(&last, &last).await.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_chain_past_depth_limit_is_range_error() {
        let vars = chain(100);
        let args = ArgumentContext::new();
        let resolver = Resolver::new(&vars, &args, &ConcatRuntime, &NoHelpers);

        let err = resolver.resolve("V99", "V99").await.unwrap_err();
        assert_eq!(err, EvaluationError::stack_overflow());
    }

    #[tokio::test]
    async fn test_missing_definition() {
        let vars = VariableMap::new();
        let args = ArgumentContext::new();
        let resolver = Resolver::new(&vars, &args, &ConcatRuntime, &NoHelpers);

        let err = resolver.resolve("NOPE", "NOPE").await.unwrap_err();
        assert_eq!(err, EvaluationError::UndefinedVariable("NOPE".to_string()));
    }

    #[test]
    fn test_argument_accessor() {
        let mut context = ArgumentContext::new();
        context.insert("user".to_string(), serde_json::json!("user123"));
        context.insert("empty".to_string(), serde_json::Value::Null);
        let accessor = Arguments { context: &context };

        assert_eq!(accessor.get("user").unwrap(), ScriptValue::string("user123"));
        assert_eq!(accessor.get("empty").unwrap(), ScriptValue::Null);
        assert_eq!(
            accessor.get("range").unwrap_err(),
            EvaluationError::UndefinedArgument("range".to_string())
        );
    }
}
