//! JSON utility functions

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Render a scalar JSON value as text.
///
/// Strings are returned without quotes; numbers and booleans use their JSON
/// spelling. Null, arrays and objects yield `None`.
pub fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize an optional string that upstream sometimes sends as a number.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_lenient_string")]`.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}
