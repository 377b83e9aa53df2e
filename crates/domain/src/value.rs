//! Script value model
//!
//! Values flowing between the engine, the scripting runtime and the helper
//! namespace. Coercions follow JavaScript rules closely enough for string
//! templating: `ToString`, `ToNumber`, truthiness and the two equalities.

use indexmap::IndexMap;
use std::fmt;

/// A value produced or consumed by expression code.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScriptValue {
    /// The absent value.
    #[default]
    Undefined,
    /// The explicit null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A double-precision number.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered list of values.
    Array(Vec<ScriptValue>),
    /// A string-keyed record preserving insertion order.
    Object(IndexMap<String, ScriptValue>),
}

impl ScriptValue {
    /// Creates a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Returns true for `undefined` and `null`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Returns the string slice if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The `typeof` name of the value.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Null | Self::Array(_) | Self::Object(_) => "object",
        }
    }

    /// JavaScript truthiness.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) => true,
        }
    }

    /// JavaScript `ToNumber`.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined | Self::Object(_) => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
            Self::Array(items) => match items.as_slice() {
                [] => 0.0,
                [single] => single.to_number(),
                _ => f64::NAN,
            },
        }
    }

    /// JavaScript `ToString`.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_display_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Strict equality (`===`). Arrays and objects compare structurally.
    #[must_use]
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            _ => self == other,
        }
    }

    /// Loose equality (`==`).
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Number(_) | Self::String(_) | Self::Bool(_), Self::Number(_) | Self::String(_) | Self::Bool(_)) => {
                self.to_number() == other.to_number()
            }
            (Self::Array(_) | Self::Object(_), Self::Number(_) | Self::String(_) | Self::Bool(_)) => {
                Self::String(self.to_display_string()).loose_eq(other)
            }
            (Self::Number(_) | Self::String(_) | Self::Bool(_), Self::Array(_) | Self::Object(_)) => {
                other.loose_eq(self)
            }
            _ => self.strict_eq(other),
        }
    }

    /// Converts to a JSON value. `undefined` and non-finite numbers become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<serde_json::Value> for ScriptValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for ScriptValue {
    fn from(value: &serde_json::Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Formats a number the way JavaScript's `Number.prototype.toString()` does
/// for the common cases.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{n:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        };
    }

    format!("{n}")
}

/// JavaScript `ToNumber` applied to a string.
#[must_use]
pub fn parse_number(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |v| v as f64);
    }

    // Rust accepts "inf" and "nan", JavaScript does not.
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')))
    {
        return f64::NAN;
    }

    trimmed.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(parse_number(" 42 "), 42.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("0x1F"), 31.0);
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("12px").is_nan());
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_display_of_compound_values() {
        let array = ScriptValue::Array(vec![
            ScriptValue::Number(1.0),
            ScriptValue::Null,
            ScriptValue::string("x"),
        ]);
        assert_eq!(array.to_display_string(), "1,,x");

        let object = ScriptValue::from(serde_json::json!({ "a": 1 }));
        assert_eq!(object.to_display_string(), "[object Object]");
        assert_eq!(ScriptValue::Undefined.to_string(), "undefined");
    }

    #[test]
    fn test_truthiness() {
        assert!(!ScriptValue::string("").is_truthy());
        assert!(ScriptValue::string("0").is_truthy());
        assert!(!ScriptValue::Number(f64::NAN).is_truthy());
        assert!(ScriptValue::Array(Vec::new()).is_truthy());
        assert!(!ScriptValue::Null.is_truthy());
    }

    #[test]
    fn test_equalities() {
        let one = ScriptValue::Number(1.0);
        let one_str = ScriptValue::string("1");
        assert!(one.loose_eq(&one_str));
        assert!(!one.strict_eq(&one_str));
        assert!(ScriptValue::Null.loose_eq(&ScriptValue::Undefined));
        assert!(!ScriptValue::Null.strict_eq(&ScriptValue::Undefined));
        assert!(!ScriptValue::Number(f64::NAN).strict_eq(&ScriptValue::Number(f64::NAN)));
        assert!(ScriptValue::Bool(true).loose_eq(&one));
    }

    #[test]
    fn test_json_round_trip_of_arguments() {
        let json = serde_json::json!({ "user": "u1", "ids": [1, 2], "active": true });
        let value = ScriptValue::from(&json);
        assert_eq!(value.to_json(), json);
        assert_eq!(ScriptValue::Undefined.to_json(), serde_json::Value::Null);
    }
}
