//! Helpers for reading loosely shaped JSON

use serde_json::Value;

/// Text form of a JSON scalar.
///
/// Strings are returned as-is, numbers and booleans in their JSON spelling.
/// Null, arrays and objects have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether a value counts as present: not null, false, zero or an empty string.
/// Empty arrays and objects are present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First of `keys` holding a present scalar, in text form
pub fn first_text_field(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter(|v| is_truthy(v))
        .find_map(scalar_text)
}
