//! File-backed adapters.

mod file_system;
mod settings_repository;
mod variable_store;

pub use file_system::TokioFileSystem;
pub use settings_repository::{SettingsError, SettingsRepository};
pub use variable_store::FileVariableStore;
