//! YAML deserialization.

use serde::de::DeserializeOwned;

use super::SerializationError;

/// Deserializes YAML from bytes.
///
/// # Errors
///
/// Returns an error if the YAML is invalid or doesn't match the expected type.
pub fn from_yaml_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_yaml::from_slice(bytes).map_err(SerializationError::Yaml)
}
