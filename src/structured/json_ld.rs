//! JSON-LD Product Parsing
//!
//! Finds schema.org `Product` nodes in `<script type="application/ld+json">`
//! blocks. Nodes may be top level, inside `@graph`, inside arrays, or nested
//! (`ItemList.itemListElement[].item`); all are collected and ranked so the
//! outermost product on the page comes first.

use dom_query::{Document, Selection};
use serde_json::{Map, Value};

/// A product node with its ranking score.
#[derive(Debug, Clone)]
struct ProductNode {
    data: Map<String, Value>,
    importance: i32,
}

/// Extract all product nodes from a document's JSON-LD, best first.
///
/// Scripts that fail to parse are skipped; the page may carry several and a
/// broken breadcrumb block must not hide a valid product block.
#[must_use]
pub fn product_nodes(doc: &Document) -> Vec<Map<String, Value>> {
    let mut products: Vec<ProductNode> = Vec::new();

    for script in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
        let script_sel = Selection::from(*script);
        let json_text = script_sel.text().trim().to_string();

        if json_text.is_empty() {
            continue;
        }

        let Ok(data) = serde_json::from_str::<Value>(&json_text) else {
            continue;
        };

        collect_products(&data, 0, &mut products);
    }

    // Stable sort keeps document order among equals
    products.sort_by(|a, b| b.importance.cmp(&a.importance));
    products.into_iter().map(|p| p.data).collect()
}

/// Recursively collect product-typed objects.
fn collect_products(value: &Value, depth: i32, products: &mut Vec<ProductNode>) {
    match value {
        Value::Object(map) => {
            let types = schema_types(value);
            let is_product = is_product_type(&types);

            if is_product {
                products.push(ProductNode {
                    data: map.clone(),
                    importance: calculate_importance(map, depth),
                });
            }

            for (key, val) in map {
                // A product's own offers/reviews never contain other products
                if is_product && matches!(key.as_str(), "offers" | "review" | "aggregateRating") {
                    continue;
                }
                collect_products(val, depth + 1, products);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_products(item, depth, products);
            }
        }
        _ => {}
    }
}

/// Get lower-cased `@type` values from a schema object.
fn schema_types(value: &Value) -> Vec<String> {
    let Some(type_val) = value.as_object().and_then(|o| o.get("@type")) else {
        return Vec::new();
    };

    match type_val {
        Value::String(s) => vec![s.to_lowercase()],
        Value::Array(arr) => arr
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_product_type(types: &[String]) -> bool {
    types.iter().any(|t| {
        matches!(
            t.as_str(),
            "product" | "productgroup" | "individualproduct" | "productmodel" | "vehicle"
        ) || t.ends_with("/product")
    })
}

/// Shallow nodes win; nodes that carry offers win over bare mentions.
fn calculate_importance(map: &Map<String, Value>, depth: i32) -> i32 {
    let base = 100 - depth * 10;
    let offers_bonus = if map.contains_key("offers") { 20 } else { 0 };
    let name_bonus = if map.contains_key("name") { 5 } else { 0 };
    base + offers_bonus + name_bonus
}
