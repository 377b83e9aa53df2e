//! Varex Application - Resolution engine, ports and use cases
//!
//! This crate defines the application layer with:
//! - The expression resolution engine (lazy, memoized, cycle-checked)
//! - Port traits for the scripting runtime, helper API and variable storage
//! - Use case orchestration with timeout handling

pub mod error;
pub mod ports;
pub mod use_cases;
pub mod variable_resolver;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    ArgumentAccessor, HelperApi, NoHelpers, ScriptRuntime, ScriptScope, VariableAccessor,
    VariableStore, VariableStoreError,
};
pub use use_cases::{
    EvaluateExpression, EvaluateExpressionInput, EvaluateExpressionOutput, EvaluationTarget,
};
pub use variable_resolver::{Evaluation, ExpressionEvaluator};
