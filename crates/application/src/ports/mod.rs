//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the expression engine and the systems
//! it runs inside. Each port is a trait that can be implemented by adapters in
//! the infrastructure layer.

mod file_system;
mod helper_api;
mod script_runtime;
mod variable_store;

pub use file_system::{FileSystem, FileSystemError};
pub use helper_api::{HelperApi, NoHelpers};
pub use script_runtime::{ArgumentAccessor, ScriptRuntime, ScriptScope, VariableAccessor};
pub use variable_store::{StaticVariableStore, VariableStore, VariableStoreError};
