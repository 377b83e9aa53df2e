//! JSON deserialization.

use serde::de::DeserializeOwned;

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// YAML deserialization failed.
    #[error("YAML deserialization failed: {0}")]
    Yaml(serde_yaml::Error),
}

/// Deserializes JSON from bytes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use varex_domain::{EngineSettings, VariableDefinition};

    #[test]
    fn test_variable_definitions() {
        let json = br#"{
  "BASE_URL": { "kind": "const", "value": "https://example.com" },
  "TASKS": { "kind": "expression", "value": "`${vars.BASE_URL}/tasks`" }
}"#;
        let parsed: BTreeMap<String, VariableDefinition> = from_json_bytes(json).unwrap();
        assert_eq!(
            parsed["BASE_URL"],
            VariableDefinition::constant("https://example.com")
        );
        assert_eq!(
            parsed["TASKS"],
            VariableDefinition::expression("`${vars.BASE_URL}/tasks`")
        );
    }

    #[test]
    fn test_settings_fill_defaults() {
        let settings: EngineSettings = from_json_bytes(br#"{"trace": true}"#).unwrap();
        assert_eq!(settings, EngineSettings::default().with_trace(true));
    }

    #[test]
    fn test_from_json_bytes_rejects_malformed_input() {
        let result = from_json_bytes::<BTreeMap<String, VariableDefinition>>(b"{\"A\": ");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
