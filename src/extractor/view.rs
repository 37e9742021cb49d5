//! Parsed form of a raw payload that strategies read from.

use dom_query::Document;
use serde_json::Value;
use url::Url;

use crate::candidate::{PayloadKind, RawPayload};
use crate::dom;
use crate::structured;
use crate::url_utils;

/// A payload parsed once and shared by every strategy of every field.
///
/// Holds a `dom_query::Document`, so views live only inside synchronous
/// extraction passes and are never kept across an await.
pub struct PayloadView {
    item: Option<Value>,
    item_error: Option<String>,
    ld_products: Vec<Value>,
    doc: Option<Document>,
    base: Option<Url>,
}

impl PayloadView {
    /// Parse a payload. `fallback_base` resolves relative URLs when the
    /// payload does not say which page it came from.
    #[must_use]
    pub fn new(payload: &RawPayload, fallback_base: Option<&Url>) -> Self {
        let base = payload
            .page_url
            .as_deref()
            .and_then(url_utils::parse_url)
            .or_else(|| fallback_base.cloned());

        match payload.kind {
            PayloadKind::Json => {
                let (item, item_error) = match serde_json::from_str::<Value>(&payload.body) {
                    Ok(value @ Value::Object(_)) => (Some(value), None),
                    Ok(_) => (None, Some("embedded item is not a JSON object".to_string())),
                    Err(e) => (None, Some(format!("embedded item is not valid JSON: {e}"))),
                };
                Self {
                    item,
                    item_error,
                    ld_products: Vec::new(),
                    doc: None,
                    base,
                }
            }
            PayloadKind::Html => {
                let doc = dom::parse(&payload.body);
                let ld_products = structured::product_nodes(&doc)
                    .into_iter()
                    .map(Value::Object)
                    .collect();
                Self {
                    item: None,
                    item_error: None,
                    ld_products,
                    doc: Some(doc),
                    base,
                }
            }
        }
    }

    /// The embedded item object, for JSON payloads.
    #[must_use]
    pub fn item(&self) -> Option<&Value> {
        self.item.as_ref()
    }

    /// Why the JSON payload could not be read, if it could not.
    #[must_use]
    pub fn item_error(&self) -> Option<&str> {
        self.item_error.as_deref()
    }

    /// Schema.org product nodes, best first, for HTML payloads.
    #[must_use]
    pub fn ld_products(&self) -> &[Value] {
        &self.ld_products
    }

    #[must_use]
    pub fn doc(&self) -> Option<&Document> {
        self.doc.as_ref()
    }

    #[must_use]
    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }
}

impl std::fmt::Debug for PayloadView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadView")
            .field("has_item", &self.item.is_some())
            .field("ld_products", &self.ld_products.len())
            .field("has_doc", &self.doc.is_some())
            .field("base", &self.base.as_ref().map(Url::as_str))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_payload_view() {
        let view = PayloadView::new(&RawPayload::json(r#"{"name":"Wallet"}"#), None);
        assert!(view.item().is_some());
        assert!(view.doc().is_none());
        assert!(view.item_error().is_none());
    }

    #[test]
    fn test_broken_json_payload_records_error() {
        let view = PayloadView::new(&RawPayload::json("{oops"), None);
        assert!(view.item().is_none());
        assert!(view.item_error().is_some_and(|e| e.contains("not valid JSON")));

        let view = PayloadView::new(&RawPayload::json("[1,2]"), None);
        assert!(view.item_error().is_some_and(|e| e.contains("not a JSON object")));
    }

    #[test]
    fn test_html_payload_base_from_page_url() {
        let payload = RawPayload::html("<div></div>").with_page_url("https://www.walmart.com/search?q=x");
        let view = PayloadView::new(&payload, None);
        assert!(view.doc().is_some());
        assert_eq!(view.base().map(Url::as_str), Some("https://www.walmart.com/search?q=x"));
    }

    #[test]
    fn test_fallback_base() {
        let fallback = Url::parse("https://shop.example.com/").unwrap_or_else(|e| panic!("{e}"));
        let view = PayloadView::new(&RawPayload::html("<div></div>"), Some(&fallback));
        assert_eq!(view.base().map(Url::as_str), Some("https://shop.example.com/"));
    }
}
