//! Field vocabulary: which fields a product record has, what a resolved value
//! looks like, and the per-try `FieldAttempt` record.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Price,
    Image,
    Link,
    Images,
    Shipping,
    Description,
}

impl Field {
    /// Fields every accepted product must have.
    pub const REQUIRED: [Field; 4] = [Field::Name, Field::Price, Field::Image, Field::Link];

    /// Fields whose absence is recorded but never blocks acceptance.
    pub const OPTIONAL: [Field; 3] = [Field::Images, Field::Shipping, Field::Description];

    /// All fields in extraction order.
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Price,
        Field::Image,
        Field::Link,
        Field::Images,
        Field::Shipping,
        Field::Description,
    ];

    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Field::Name | Field::Price | Field::Image | Field::Link)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Price => "price",
            Field::Image => "image",
            Field::Link => "link",
            Field::Images => "images",
            Field::Shipping => "shipping",
            Field::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma-separated field list for messages (`"price, image"`).
#[must_use]
pub fn field_list(fields: &[Field]) -> String {
    fields.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
}

/// A resolved field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Cleaned text (name, shipping, description).
    Text(String),
    /// Canonical decimal price.
    Price(Decimal),
    /// Absolute http(s) URL (image, link).
    Url(String),
    /// Absolute URLs in document order, de-duplicated (images).
    Urls(Vec<String>),
}

impl FieldValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Url(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_price(&self) -> Option<Decimal> {
        match self {
            FieldValue::Price(p) => Some(*p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_urls(&self) -> Option<&[String]> {
        match self {
            FieldValue::Urls(v) => Some(v),
            _ => None,
        }
    }

    /// Short rendering for logs.
    #[must_use]
    pub fn preview(&self) -> String {
        const MAX: usize = 140;
        let full = match self {
            FieldValue::Text(s) | FieldValue::Url(s) => s.clone(),
            FieldValue::Price(p) => p.to_string(),
            FieldValue::Urls(v) => format!("{} url(s): {}", v.len(), v.join(" ")),
        };
        if full.chars().count() > MAX {
            let cut: String = full.chars().take(MAX).collect();
            format!("{cut}…")
        } else {
            full
        }
    }
}

/// How a strategy reads its value out of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractMode {
    /// Element text, or a scalar from structured data.
    Text,
    /// One attribute of the first matching element.
    Attribute,
    /// An attribute collected over every matching element (or a structured array).
    AttributeList,
}

/// Strategy tier. Tiers are tried in this order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    StructuredData,
    Selector,
    DetailPage,
}

impl Tier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::StructuredData => "structured-data",
            Tier::Selector => "selector",
            Tier::DetailPage => "detail-page",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one strategy try.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success { value: FieldValue },
    Failure { reason: String },
}

impl AttemptOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }
}

/// One extraction try for one field of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAttempt {
    pub field: Field,
    /// 1-based, increasing per field per candidate (detail-page tries continue
    /// the numbering of the card tries).
    pub index: u32,
    pub tier: Tier,
    /// Human-readable locator, e.g. `css:img[data-testid="productTileImage"]@src`.
    pub locator: String,
    pub mode: ExtractMode,
    pub outcome: AttemptOutcome,
}
