//! Variable definition types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a variable's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// The value is used verbatim.
    #[serde(rename = "const")]
    Constant,
    /// The value is source code that produces a string when executed.
    Expression,
}

impl VariableKind {
    /// Returns the persisted name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "const",
            Self::Expression => "expression",
        }
    }
}

/// A named variable as stored by the embedding service.
///
/// Persisted as `{ "kind": "const" | "expression", "value": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Whether `value` is a literal or executable source.
    pub kind: VariableKind,

    /// The literal value, or the expression source.
    pub value: String,
}

impl VariableDefinition {
    /// Creates a constant definition.
    #[must_use]
    pub fn constant(value: impl Into<String>) -> Self {
        Self {
            kind: VariableKind::Constant,
            value: value.into(),
        }
    }

    /// Creates an expression definition.
    #[must_use]
    pub fn expression(source: impl Into<String>) -> Self {
        Self {
            kind: VariableKind::Expression,
            value: source.into(),
        }
    }

    /// Returns true if the definition must be executed to obtain its value.
    #[must_use]
    pub const fn is_expression(&self) -> bool {
        matches!(self.kind, VariableKind::Expression)
    }
}

/// Variable definitions keyed by unique name, supplied fresh per evaluation.
pub type VariableMap = HashMap<String, VariableDefinition>;

/// Runtime arguments keyed by name, supplied fresh per evaluation.
pub type ArgumentContext = HashMap<String, serde_json::Value>;

/// A variable that was resolved during one evaluation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariable {
    /// The variable name.
    pub name: String,
    /// The kind of the definition it came from.
    pub kind: VariableKind,
    /// The resolved value.
    pub value: String,
}

impl ResolvedVariable {
    /// Creates a new resolved variable.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: VariableKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }
}

/// Validates a variable name for dotted access (`vars.NAME`).
///
/// Names that fail this check can still be defined; they are only reachable
/// through computed access (`vars["some name"]`).
#[must_use]
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !first.is_alphabetic() && first != '_' && first != '$' {
        return false;
    }

    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
