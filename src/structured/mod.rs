//! Structured data readers.
//!
//! Product pages usually carry the record twice: once as machine-readable
//! data (an embedded search blob, schema.org JSON-LD) and once as markup. The
//! structured copy is the first tier of every field's strategy chain.

pub mod json_ld;
pub mod next_data;

use serde_json::Value;

use crate::patterns;

pub use json_ld::product_nodes;
pub use next_data::{search_items, NextDataError, SearchItems};

/// Keys consulted, in order, when a scalar is wanted but an object is found
/// (`{"@type": "ImageObject", "url": "..."}`, `{"text": "Free shipping"}`).
const SCALAR_KEYS: &[&str] = &["url", "contentUrl", "text", "message", "value", "price"];

/// Walk a key path through nested objects.
///
/// Arrays along the way are searched for the first element that has the next
/// key, which handles `offers` being either an object or a list of them.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = match current {
            Value::Object(map) => map.get(*key)?,
            Value::Array(items) => items.iter().find_map(|item| item.get(*key))?,
            _ => return None,
        };
    }
    match current {
        Value::Null => None,
        other => Some(other),
    }
}

/// Render a JSON value as a single cleaned string.
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => patterns::clean_text(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(value_text),
        Value::Object(map) => SCALAR_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(value_text)),
        Value::Bool(_) | Value::Null => None,
    }
}

/// Render a JSON value as a list of strings (arrays expand, scalars become a
/// one-element list).
#[must_use]
pub fn value_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_text).collect(),
        other => value_text(other).into_iter().collect(),
    }
}
