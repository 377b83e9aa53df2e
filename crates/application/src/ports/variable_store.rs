//! Variable store port
//!
//! Defines the interface of the external collaborator that supplies the
//! effective variable map for one evaluation. Scoping and merging of
//! definitions happen behind this trait.

use async_trait::async_trait;

use varex_domain::VariableMap;

/// Errors that can occur while loading variable definitions.
#[derive(Debug, thiserror::Error)]
pub enum VariableStoreError {
    /// The backing source does not exist.
    #[error("Variable source not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Source of variable definitions.
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// Loads the variable map that applies to the caller.
    ///
    /// # Errors
    /// Returns an error if the definitions cannot be read or parsed.
    async fn load(&self) -> Result<VariableMap, VariableStoreError>;
}

/// A store over a fixed, in-memory variable map.
#[derive(Debug, Clone, Default)]
pub struct StaticVariableStore {
    variables: VariableMap,
}

impl StaticVariableStore {
    /// Creates a store that always returns `variables`.
    #[must_use]
    pub const fn new(variables: VariableMap) -> Self {
        Self { variables }
    }
}

#[async_trait]
impl VariableStore for StaticVariableStore {
    async fn load(&self) -> Result<VariableMap, VariableStoreError> {
        Ok(self.variables.clone())
    }
}
