//! Rich-text flattening.
//!
//! Formatted content fields arrive as a Lexical-style tree:
//! `{root: {children: [...]}}` where block nodes (`paragraph`, `listitem`,
//! …) nest inline `text` nodes. The renderer only needs the plain text, so
//! this module reduces the tree by concatenating `text` node contents and
//! appending a newline after each `paragraph` and `listitem` node.
//!
//! The reducer is pure and total: plain strings pass through unchanged,
//! and any other malformed input produces the empty string.

use serde_json::{Value, json};

/// Flatten a rich-text value to plain text.
#[must_use]
pub fn plain_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("root")
            .and_then(|root| root.get("children"))
            .and_then(Value::as_array)
            .map(|children| collect_nodes(children))
            .unwrap_or_default(),
        Value::Array(nodes) => collect_nodes(nodes),
        _ => String::new(),
    }
}

fn collect_nodes(nodes: &[Value]) -> String {
    let mut out = String::new();
    for node in nodes {
        collect_node(node, &mut out);
    }
    out
}

fn collect_node(node: &Value, out: &mut String) {
    let node_type = node.get("type").and_then(Value::as_str);

    if node_type == Some("text") {
        if let Some(text) = node.get("text").and_then(Value::as_str) {
            out.push_str(text);
        }
        return;
    }

    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            collect_node(child, out);
        }
        if matches!(node_type, Some("paragraph" | "listitem")) {
            out.push('\n');
        }
    }
}

/// Wrap a plain string in a single-paragraph rich-text tree, the shape an
/// editor produces for one line of text. Trailing paragraph newlines are
/// the caller's concern; [`plain_text`] of this tree is `s` plus `"\n"`.
#[must_use]
pub fn paragraph(s: &str) -> Value {
    json!({
        "root": {
            "type": "root",
            "children": [{
                "type": "paragraph",
                "children": [{"type": "text", "text": s}],
            }],
        }
    })
}
