//! Result types for collection output.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::candidate::{Candidate, CandidateRef};
use crate::collector::context::RunId;
use crate::extractor::{Field, FieldValue, Tier};

/// A candidate that passed required-field validation, the price filter and
/// deduplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedProduct {
    pub name: String,
    pub price: Decimal,
    pub image: String,
    /// Link as extracted (absolute).
    pub link: String,
    /// Normalized link the run deduplicated on.
    pub canonical_link: String,

    /// Gallery images; `[image]` when no list resolved.
    pub images: Vec<String>,
    pub shipping: Option<String>,
    pub description: Option<String>,

    /// Highest tier any field resolved from.
    pub source: Tier,
    /// Tier each resolved field came from.
    pub provenance: BTreeMap<Field, Tier>,
    pub detail_enriched: bool,
    pub page: u32,
    pub position: usize,
}

impl AcceptedProduct {
    /// Build from a candidate whose required fields are all resolved.
    /// Returns `None` if one is not; the candidate is left to the caller.
    pub(crate) fn from_candidate(candidate: &Candidate, canonical_link: String) -> Option<Self> {
        let text = |field: Field| candidate.value(field).and_then(FieldValue::as_text).map(str::to_string);

        let name = text(Field::Name)?;
        let image = text(Field::Image)?;
        let link = text(Field::Link)?;
        let price = candidate.price()?;

        let images = candidate
            .value(Field::Images)
            .and_then(FieldValue::as_urls)
            .map_or_else(|| vec![image.clone()], <[String]>::to_vec);

        let provenance: BTreeMap<Field, Tier> = Field::ALL
            .into_iter()
            .filter_map(|f| candidate.provenance(f).map(|t| (f, t)))
            .collect();
        let source = provenance.values().copied().max().unwrap_or(Tier::StructuredData);
        let CandidateRef { page, index } = candidate.position;

        Some(Self {
            shipping: text(Field::Shipping),
            description: text(Field::Description),
            name,
            price,
            image,
            link,
            canonical_link,
            images,
            source,
            provenance,
            detail_enriched: candidate.detail_enriched(),
            page,
            position: index,
        })
    }
}

/// Ceiling that ended a run short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardStop {
    MaxPages,
    MaxAttempts,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum TerminationReason {
    /// Exactly the requested count was collected.
    Done,
    /// A hard stop was reached first.
    Shortfall { hard_stop: HardStop },
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Done => f.write_str("DONE"),
            TerminationReason::Shortfall {
                hard_stop: HardStop::MaxPages,
            } => f.write_str("SHORTFALL (max pages)"),
            TerminationReason::Shortfall {
                hard_stop: HardStop::MaxAttempts,
            } => f.write_str("SHORTFALL (max attempts)"),
        }
    }
}

/// Final output of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionResult {
    pub run_id: RunId,
    /// In acceptance order.
    pub products: Vec<AcceptedProduct>,
    pub requested: usize,
    pub collected: usize,
    /// Fetch requests issued, retries included.
    pub attempts: u32,
    pub pages: u32,
    /// `requested - collected`.
    pub shortfall: usize,
    pub termination: TerminationReason,
}

impl CollectionResult {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.termination, TerminationReason::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::RawPayload;

    fn resolved_candidate() -> Candidate {
        let mut c = Candidate::new(CandidateRef { page: 1, index: 3 }, RawPayload::json("{}"));
        c.resolve(Field::Name, FieldValue::Text("Wallet".into()), Tier::StructuredData);
        c.resolve(Field::Price, FieldValue::Price(Decimal::new(20, 0)), Tier::Selector);
        c.resolve(Field::Image, FieldValue::Url("https://i5.walmartimages.com/a.jpg".into()), Tier::StructuredData);
        c.resolve(Field::Link, FieldValue::Url("https://www.walmart.com/ip/1".into()), Tier::StructuredData);
        c
    }

    #[test]
    fn test_images_default_to_image() {
        let p = AcceptedProduct::from_candidate(&resolved_candidate(), "https://www.walmart.com/ip/1".into())
            .unwrap_or_else(|| panic!("complete candidate"));
        assert_eq!(p.images, vec!["https://i5.walmartimages.com/a.jpg".to_string()]);
        assert_eq!(p.source, Tier::Selector);
        assert_eq!(p.provenance.get(&Field::Price), Some(&Tier::Selector));
        assert_eq!((p.page, p.position), (1, 3));
        assert!(p.shipping.is_none());
    }

    #[test]
    fn test_incomplete_candidate_is_none() {
        let c = Candidate::new(CandidateRef { page: 1, index: 1 }, RawPayload::json("{}"));
        assert!(AcceptedProduct::from_candidate(&c, String::new()).is_none());
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(TerminationReason::Done.to_string(), "DONE");
        assert_eq!(
            TerminationReason::Shortfall { hard_stop: HardStop::MaxAttempts }.to_string(),
            "SHORTFALL (max attempts)"
        );
    }
}
