//! Lenient readers for exchange JSON payloads.
//!
//! Venues report numbers either as JSON numbers or as numeric strings.

use serde_json::Value;

/// Read a finite number from a JSON number or numeric string.
///
/// Blank strings, non-numeric strings and non-finite values yield `None`.
#[must_use]
pub fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

/// Read a finite number from an optional field.
#[must_use]
pub fn field_number(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(number)
}

/// Read a non-empty string field.
#[must_use]
pub fn field_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
