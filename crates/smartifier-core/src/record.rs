//! JSONL record model.
//!
//! Each input line is one self-contained JSON object. Records are parsed
//! into `serde_json` maps; field iteration preserves the original encounter
//! order (the `preserve_order` feature), which the writers rely on when
//! re-emitting all non-special fields.

use serde_json::{Map, Value};
use tracing::warn;

/// Parse one JSONL line into its top-level object.
pub fn parse_object(line: &str) -> serde_json::Result<Map<String, Value>> {
    serde_json::from_str(line)
}

/// Render a field value back out as compact JSON.
pub fn to_json(value: &Value) -> String {
    value.to_string()
}

/// Append `"name":<value>` to `out`, JSON-escaping the name.
pub fn push_field(out: &mut String, name: &str, value: &Value) {
    out.push_str(&Value::String(name.to_string()).to_string());
    out.push(':');
    out.push_str(&value.to_string());
}

/// Append `"name":"value"` to `out` for a plain string value.
pub fn push_string_field(out: &mut String, name: &str, value: &str) {
    out.push_str(&Value::String(name.to_string()).to_string());
    out.push(':');
    out.push_str(&Value::String(value.to_string()).to_string());
}

/// Coerce a smart graph attribute value to a string.
///
/// Strings pass through. A missing field falls back to `smart_default` when
/// one is configured. Scalars (bool, number) are stringified with a warning;
/// null, arrays and objects cannot be converted and yield the empty string.
pub fn smart_to_string(value: Option<&Value>, smart_default: Option<&str>, line_no: u64) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        None => smart_default.unwrap_or_default().to_string(),
        Some(Value::Bool(b)) => {
            warn!("line {line_no}: non-string smart graph attribute, converted to string");
            b.to_string()
        }
        Some(Value::Number(n)) => {
            warn!("line {line_no}: non-string smart graph attribute, converted to string");
            n.to_string()
        }
        Some(_) => {
            warn!("line {line_no}: smart graph attribute has a complex type, cannot convert");
            String::new()
        }
    }
}
