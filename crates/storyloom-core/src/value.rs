//! Variable values and the variable store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scenario variable value.
///
/// Equality is strict per type: the string `"1"` is not equal to the number
/// `1`, and `true` is not equal to the number `1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean flag.
    Bool(bool),
    /// A number. Scripts do not distinguish integers from floats.
    Number(f64),
    /// A string.
    String(String),
}

impl Value {
    /// Returns the type name used in messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

/// Named variables for one playback session.
///
/// Ordered so snapshots compare and serialize deterministically.
pub type Variables = BTreeMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_follows_variant() {
        assert_eq!(Value::from(true).type_name(), "boolean");
        assert_eq!(Value::from(2).type_name(), "number");
        assert_eq!(Value::from("true").type_name(), "string");
    }

    #[test]
    fn test_values_of_different_types_are_never_equal() {
        assert_ne!(Value::from("1"), Value::from(1));
        assert_ne!(Value::from(true), Value::from(1));
        assert_ne!(Value::from("true"), Value::from(true));
    }

    #[test]
    fn test_untagged_deserialization_picks_matching_variant() {
        let values: Vec<Value> = serde_json::from_str(r#"[true, 3, 2.5, "x"]"#).unwrap();

        assert_eq!(
            values,
            vec![
                Value::Bool(true),
                Value::Number(3.0),
                Value::Number(2.5),
                Value::String("x".to_owned()),
            ]
        );
    }

    #[test]
    fn test_display_renders_raw_value() {
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::from(2).to_string(), "2");
    }
}
