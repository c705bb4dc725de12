//! `{{path}}` placeholder substitution.
//!
//! Templates in email and webhook action configuration reference the
//! event payload through dot paths, e.g. `"From {{data.name}}"`. Each
//! placeholder is a pure lookup — never an evaluated expression — so
//! template content cannot inject behavior. Placeholders that do not
//! resolve substitute the empty string.

use serde_json::Value;

use crate::path;

/// Resolve every `{{path}}` placeholder in `template` against `data`.
#[must_use]
pub fn resolve(template: &str, data: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let placeholder = after_open[..end].trim();
                if let Some(value) = path::lookup(data, placeholder) {
                    out.push_str(&path::value_to_string(value));
                }
                rest = &after_open[end + 2..];
            }
            None => {
                // Unterminated placeholder: emit the remainder verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
