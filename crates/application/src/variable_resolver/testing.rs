//! Test doubles for the resolution engine.
//!
//! `ConcatRuntime` understands just enough syntax to drive the engine:
//! `return term + term + ...;` where a term is `vars.NAME`, `args.NAME`,
//! `api.NAME()` or a `'quoted'` literal.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use varex_domain::{EvaluationError, ScriptValue};

use crate::ports::{HelperApi, ScriptRuntime, ScriptScope};

pub struct ConcatRuntime;

#[async_trait]
impl ScriptRuntime for ConcatRuntime {
    async fn execute<'a>(
        &'a self,
        body: &'a str,
        scope: ScriptScope<'a>,
    ) -> Result<ScriptValue, EvaluationError> {
        let expression = body
            .strip_prefix("return ")
            .and_then(|rest| rest.strip_suffix(';'))
            .ok_or_else(|| EvaluationError::runtime("SyntaxError", body))?;

        let mut out = String::new();
        for term in expression.split(" + ") {
            let piece = if let Some(name) = term.strip_prefix("vars.") {
                scope.variables.get(name).await?
            } else if let Some(name) = term.strip_prefix("args.") {
                scope.arguments.get(name)?.to_display_string()
            } else if let Some(helper) = term
                .strip_prefix("api.")
                .and_then(|rest| rest.strip_suffix("()"))
            {
                scope
                    .helpers
                    .call(helper, Vec::new())
                    .await
                    .map_err(EvaluationError::Runtime)?
                    .to_display_string()
            } else if let Some(literal) = term
                .strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
            {
                literal.to_string()
            } else {
                return Err(EvaluationError::unbound_identifier(term));
            };
            out.push_str(&piece);
        }

        Ok(ScriptValue::String(out))
    }
}

/// Helpers whose `tick()` counts how often it ran.
#[derive(Default)]
pub struct CountingHelpers {
    calls: AtomicUsize,
}

impl CountingHelpers {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HelperApi for CountingHelpers {
    async fn call(&self, name: &str, _args: Vec<ScriptValue>) -> Result<ScriptValue, String> {
        match name {
            "tick" => {
                let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(ScriptValue::string(count.to_string()))
            }
            _ => Err(format!("TypeError: api.{name} is not a function")),
        }
    }
}
