//! Per-candidate verdicts.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::extractor::{field_list, Field};

/// Why a candidate was not accepted. Terminal for that candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum Rejection {
    #[error("required field(s) missing: {}", field_list(fields))]
    RequiredFieldMissing { fields: Vec<Field> },

    #[error("detail enrichment failed ({cause}); still missing: {}", field_list(missing))]
    DetailEnrichmentFailed { missing: Vec<Field>, cause: String },

    #[error("duplicate link {link} (first accepted as {first_seen})")]
    DuplicateLink {
        link: String,
        canonical: String,
        first_seen: String,
    },

    #[error("price outside bounds: {price} not in [{}, {}]", bound(*min), bound(*max))]
    PriceOutOfBounds {
        price: Decimal,
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
}

fn bound(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl Rejection {
    /// Stable reason code for logs and raw records.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Rejection::RequiredFieldMissing { .. } => "required-field-missing",
            Rejection::DetailEnrichmentFailed { .. } => "detail-enrichment-failed",
            Rejection::DuplicateLink { .. } => "duplicate-link",
            Rejection::PriceOutOfBounds { .. } => "price-out-of-bounds",
        }
    }

    /// Fields that were missing, for rejections caused by missing fields.
    #[must_use]
    pub fn missing_fields(&self) -> &[Field] {
        match self {
            Rejection::RequiredFieldMissing { fields } => fields,
            Rejection::DetailEnrichmentFailed { missing, .. } => missing,
            _ => &[],
        }
    }
}
