//! Variable resolution module
//!
//! The expression resolution engine: evaluates a root expression against a
//! map of variable definitions and runtime arguments, resolving referenced
//! variables lazily, memoizing them for the duration of one call and
//! detecting circular references.
//!
//! # Usage
//!
//! ```ignore
//! use varex_application::ports::NoHelpers;
//! use varex_application::variable_resolver::ExpressionEvaluator;
//! use varex_domain::{ArgumentContext, VariableDefinition, VariableMap};
//!
//! let mut variables = VariableMap::new();
//! variables.insert(
//!     "BASE_URL".to_string(),
//!     VariableDefinition::constant("https://example.com"),
//! );
//!
//! // Any `ScriptRuntime` implementation, e.g. the infrastructure interpreter.
//! let evaluator = ExpressionEvaluator::new(runtime);
//! let url = evaluator
//!     .evaluate(&variables, &ArgumentContext::new(), &NoHelpers, "`${vars.BASE_URL}/tasks`")
//!     .await?;
//! assert_eq!(url, "https://example.com/tasks");
//! ```

mod engine;
pub mod evaluator;
pub mod normalizer;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use evaluator::{Evaluation, ExpressionEvaluator};
pub use engine::MAX_RESOLUTION_DEPTH;
pub use normalizer::normalize;
pub use session::EvaluationSession;
