//! Varex Domain - Core types
//!
//! This crate defines the data model of the expression engine: variable
//! definitions, runtime arguments, script values and the error taxonomy.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod settings;
pub mod value;
pub mod variable;

pub use error::{EvaluationError, EvaluationResult};
pub use settings::EngineSettings;
pub use value::ScriptValue;
pub use variable::{
    ArgumentContext, ResolvedVariable, VariableDefinition, VariableKind, VariableMap,
    is_identifier_name,
};
