//! Embedded search blob (`<script id="__NEXT_DATA__">`).
//!
//! Server-rendered search pages ship the full result set as JSON under
//! `props.pageProps.initialData.searchResult.itemStacks[].items[]`. Reading it
//! is far more stable than scraping tiles, so the page splitter prefers it.

use dom_query::Document;
use serde_json::Value;

use super::lookup;

const ITEM_STACKS_PATH: &[&str] = &["props", "pageProps", "initialData", "searchResult", "itemStacks"];

/// Products found in the embedded blob.
#[derive(Debug, Clone, Default)]
pub struct SearchItems {
    /// Items whose `__typename` is `Product`, in page order.
    pub products: Vec<Value>,
    /// Ads, banners and other non-product tiles that were skipped.
    pub skipped: usize,
}

/// The blob exists but could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NextDataError {
    #[error("embedded search data is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("embedded search data has no itemStacks")]
    MissingItemStacks,
}

/// Read product items from the page's embedded search blob.
///
/// Returns `Ok(None)` when the page has no blob at all.
pub fn search_items(doc: &Document) -> Result<Option<SearchItems>, NextDataError> {
    let script = doc.select(r#"script#__NEXT_DATA__"#);
    if !script.exists() {
        return Ok(None);
    }

    let text = script.text();
    let data: Value = serde_json::from_str(text.trim())
        .map_err(|e| NextDataError::InvalidJson(e.to_string()))?;

    let stacks = lookup(&data, ITEM_STACKS_PATH)
        .and_then(Value::as_array)
        .ok_or(NextDataError::MissingItemStacks)?;

    let mut result = SearchItems::default();
    for item in stacks
        .iter()
        .filter_map(|stack| stack.get("items").and_then(Value::as_array))
        .flatten()
    {
        if item.get("__typename").and_then(Value::as_str) == Some("Product") {
            result.products.push(item.clone());
        } else {
            result.skipped += 1;
        }
    }

    Ok(Some(result))
}
