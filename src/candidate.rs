//! Raw payloads and in-flight candidates.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::extractor::{Field, FieldAttempt, FieldValue, Tier};

/// What a raw payload contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// One item object from an embedded JSON blob.
    Json,
    /// An HTML fragment (search result tile) or a full detail page.
    Html,
}

/// A candidate node exactly as the fetch capability produced it.
///
/// The body is kept verbatim so it can be persisted for forensics even when
/// the candidate is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPayload {
    pub kind: PayloadKind,
    pub body: String,
    /// URL of the page the payload came from; relative links resolve against it.
    pub page_url: Option<String>,
}

impl RawPayload {
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            kind: PayloadKind::Json,
            body: body.into(),
            page_url: None,
        }
    }

    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            kind: PayloadKind::Html,
            body: body.into(),
            page_url: None,
        }
    }

    #[must_use]
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }
}

/// Position of a candidate within a run: page index and 1-based index on
/// that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateRef {
    pub page: u32,
    pub index: usize,
}

impl fmt::Display for CandidateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}#{}", self.page, self.index)
    }
}

/// A tentative product before acceptance.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub position: CandidateRef,
    pub raw: RawPayload,
    /// Detail page payload, when the enrichment pass fetched one.
    pub detail_raw: Option<RawPayload>,
    fields: BTreeMap<Field, (FieldValue, Tier)>,
    attempts: Vec<FieldAttempt>,
    detail_enriched: bool,
}

impl Candidate {
    #[must_use]
    pub fn new(position: CandidateRef, raw: RawPayload) -> Self {
        Self {
            position,
            raw,
            detail_raw: None,
            fields: BTreeMap::new(),
            attempts: Vec::new(),
            detail_enriched: false,
        }
    }

    /// Resolved value of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field).map(|(v, _)| v)
    }

    /// Tier that resolved a field.
    #[must_use]
    pub fn provenance(&self, field: Field) -> Option<Tier> {
        self.fields.get(&field).map(|(_, t)| *t)
    }

    #[must_use]
    pub fn is_resolved(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.value(Field::Link).and_then(FieldValue::as_text)
    }

    #[must_use]
    pub fn price(&self) -> Option<Decimal> {
        self.value(Field::Price).and_then(FieldValue::as_price)
    }

    /// Required fields without a value, in canonical order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|f| !self.is_resolved(*f))
            .collect()
    }

    /// Optional fields without a value.
    #[must_use]
    pub fn missing_optional(&self) -> Vec<Field> {
        Field::OPTIONAL
            .into_iter()
            .filter(|f| !self.is_resolved(*f))
            .collect()
    }

    #[must_use]
    pub fn attempts(&self) -> &[FieldAttempt] {
        &self.attempts
    }

    pub fn attempts_for(&self, field: Field) -> impl Iterator<Item = &FieldAttempt> {
        self.attempts.iter().filter(move |a| a.field == field)
    }

    #[must_use]
    pub const fn detail_enriched(&self) -> bool {
        self.detail_enriched
    }

    pub(crate) fn mark_enriched(&mut self) {
        self.detail_enriched = true;
    }

    pub(crate) fn record_attempt(&mut self, attempt: FieldAttempt) {
        self.attempts.push(attempt);
    }

    pub(crate) fn resolve(&mut self, field: Field, value: FieldValue, tier: Tier) {
        self.fields.insert(field, (value, tier));
    }
}
