//! Prompt text normalization.
//!
//! The host delivers the submitted prompt in several shapes: a plain
//! string, an ordered list of content blocks, or a single object carrying a
//! `text` field. [`normalize`] flattens all of them to plain text and never
//! fails; unrecognized shapes degrade to their JSON rendering or to empty
//! text.

use serde_json::Value;

/// Flatten a prompt payload into plain text.
///
/// - string: returned unchanged
/// - array: newline-joined text of string elements and of objects whose
///   `type` is `"text"`; other elements are skipped
/// - object with a `text` key: that value
/// - anything else: rendered if truthy, otherwise empty
pub fn normalize(prompt: &Value) -> String {
    match prompt {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(block_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) if map.contains_key("text") => {
            map.get("text").map(render_text).unwrap_or_default()
        }
        other if is_truthy(other) => other.to_string(),
        _ => String::new(),
    }
}

/// JSON truthiness: null, false, 0, "", [] and {} are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Text contributed by one element of a content-block list.
fn block_text(item: &Value) -> Option<String> {
    match item {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) if map.get("type").and_then(Value::as_str) == Some("text") => {
            Some(map.get("text").map(render_text).unwrap_or_default())
        }
        _ => None,
    }
}

/// Render a `text` field value; strings verbatim, null as empty.
fn render_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
