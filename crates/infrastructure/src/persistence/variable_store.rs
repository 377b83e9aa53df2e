//! File-backed variable store.
//!
//! A variable file maps names to definitions:
//!
//! ```json
//! {
//!   "BASE_URL": { "kind": "const", "value": "https://example.com" },
//!   "TASKS": { "kind": "expression", "value": "`${vars.BASE_URL}/tasks`" }
//! }
//! ```
//!
//! The same shape is accepted as YAML when the file ends in `.yaml` or `.yml`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use varex_application::ports::{FileSystem, FileSystemError, VariableStore, VariableStoreError};
use varex_domain::VariableMap;

use crate::serialization::{SerializationError, from_json_bytes, from_yaml_bytes};

/// Supported variable file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    fn parse(self, bytes: &[u8]) -> Result<VariableMap, SerializationError> {
        match self {
            Self::Json => from_json_bytes(bytes),
            Self::Yaml => from_yaml_bytes(bytes),
        }
    }
}

/// Loads the variable map from a single file on every call.
#[derive(Debug, Clone)]
pub struct FileVariableStore<F> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> FileVariableStore<F> {
    /// Creates a store reading `path` through `fs`.
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<F: FileSystem> VariableStore for FileVariableStore<F> {
    async fn load(&self) -> Result<VariableMap, VariableStoreError> {
        let Some(format) = FileFormat::from_path(&self.path) else {
            return Err(VariableStoreError::Serialization(format!(
                "unsupported variable file extension: {}",
                self.path.display()
            )));
        };

        let content = self.fs.read_file(&self.path).await.map_err(|e| match e {
            FileSystemError::NotFound(path) => {
                VariableStoreError::NotFound(path.display().to_string())
            }
            FileSystemError::PermissionDenied(path) => VariableStoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                path.display().to_string(),
            )),
            FileSystemError::Io(io) => VariableStoreError::Io(io),
        })?;

        let variables = format
            .parse(&content)
            .map_err(|e| VariableStoreError::Serialization(e.to_string()))?;
        debug!(path = %self.path.display(), count = variables.len(), "Loaded variables");
        Ok(variables)
    }
}
