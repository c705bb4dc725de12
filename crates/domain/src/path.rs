//! Dot-path lookup into a JSON tree.
//!
//! Condition fields and template placeholders address the event payload
//! with paths like `data.formData.email`. A path that does not resolve
//! yields `None` — never an error.

use serde_json::Value;

/// Look up `path` in `root`, descending one object key per dot-separated
/// segment. Returns `None` when any segment is missing or when descending
/// into a non-object.
#[must_use]
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Render a JSON value the way an operator or template compares it:
/// strings unquoted, scalars via their JSON form, `null` as empty.
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a JSON value to a number, accepting numeric strings.
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
