//! Varex Infrastructure - Adapters and implementations
//!
//! This crate provides the embedded scripting runtime, the helper namespace
//! and the file-backed adapters for the ports defined in the application
//! layer.

pub mod helpers;
pub mod persistence;
pub mod scripting;
pub mod serialization;

pub use helpers::{HelperRegistry, standard_helpers};
pub use persistence::{FileVariableStore, SettingsError, SettingsRepository, TokioFileSystem};
pub use scripting::{ParseError, References, ScriptInterpreter, parse_program, references};
pub use serialization::{SerializationError, from_json_bytes, from_yaml_bytes};
