//! Product assembly.
//!
//! Runs every field's card chain over a candidate, spends the single
//! detail-page enrichment when the policy allows it, and then decides whether
//! all required fields resolved.

use url::Url;

use crate::candidate::{Candidate, RawPayload};
use crate::capabilities::DetailFetcher;
use crate::diagnostics::{DiagnosticEvent, RunDiagnostics};
use crate::extractor::{Field, FieldExtractor, PayloadView};
use crate::options::EnrichmentPolicy;
use crate::rejection::Rejection;
use crate::selector;

/// Verdict of the assembler.
#[derive(Debug)]
pub enum Assembly {
    /// Every required field resolved.
    Complete(Candidate),
    /// Rejected; the candidate is kept for raw persistence.
    Rejected(Candidate, Rejection),
}

/// Builds candidate records from raw payloads.
#[derive(Debug, Clone, Copy)]
pub struct ProductAssembler<'a> {
    extractor: FieldExtractor<'a>,
    diag: &'a RunDiagnostics,
    policy: EnrichmentPolicy,
    base: Option<&'a Url>,
}

impl<'a> ProductAssembler<'a> {
    #[must_use]
    pub const fn new(diag: &'a RunDiagnostics, policy: EnrichmentPolicy, base: Option<&'a Url>) -> Self {
        Self {
            extractor: FieldExtractor::new(diag),
            diag,
            policy,
            base,
        }
    }

    /// Assemble a candidate, using `detail` for the one enrichment fetch.
    pub async fn assemble(&self, mut candidate: Candidate, detail: Option<&dyn DetailFetcher>) -> Assembly {
        self.extract_card(&mut candidate);

        let mut enrichment_error = None;
        if let Some(fetcher) = detail.filter(|_| self.wants_enrichment(&candidate)) {
            self.diag.emit(DiagnosticEvent::EnrichmentRequested {
                candidate: candidate.position,
                link: candidate.link().unwrap_or_default().to_string(),
                missing: candidate.missing_required(),
            });
            candidate.mark_enriched();

            match fetcher.fetch_detail(&candidate).await {
                Ok(payload) => self.enrich(&mut candidate, payload),
                Err(e) => {
                    self.diag.emit(DiagnosticEvent::EnrichmentFinished {
                        candidate: candidate.position,
                        resolved: Vec::new(),
                        error: Some(e.to_string()),
                    });
                    enrichment_error = Some(e.to_string());
                }
            }
        }

        self.finish(candidate, enrichment_error)
    }

    /// Run every field's card chain.
    pub fn extract_card(&self, candidate: &mut Candidate) {
        let view = PayloadView::new(&candidate.raw, self.base);
        for field in Field::ALL {
            self.extractor
                .extract(candidate, &view, field, selector::card_chain(field));
        }
    }

    /// Whether the candidate qualifies for its detail-page fetch.
    #[must_use]
    pub fn wants_enrichment(&self, candidate: &Candidate) -> bool {
        if candidate.detail_enriched() || candidate.missing_required().is_empty() {
            return false;
        }
        match self.policy {
            EnrichmentPolicy::Disabled => false,
            EnrichmentPolicy::PriceOnly => {
                candidate.is_resolved(Field::Link)
                    && candidate.is_resolved(Field::Image)
                    && !candidate.is_resolved(Field::Price)
            }
            EnrichmentPolicy::AnyRequiredMissing => candidate.is_resolved(Field::Link),
        }
    }

    /// Run detail chains for every field the card left unresolved.
    pub fn enrich(&self, candidate: &mut Candidate, payload: RawPayload) {
        let before: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|f| !candidate.is_resolved(*f))
            .collect();

        {
            let view = PayloadView::new(&payload, self.base);
            for field in &before {
                self.extractor
                    .extract(candidate, &view, *field, selector::detail_chain(*field));
            }
        }

        let resolved = before
            .into_iter()
            .filter(|f| candidate.is_resolved(*f))
            .collect();
        candidate.detail_raw = Some(payload);
        candidate.mark_enriched();
        self.diag.emit(DiagnosticEvent::EnrichmentFinished {
            candidate: candidate.position,
            resolved,
            error: None,
        });
    }

    /// Report exhausted fields and give the verdict.
    #[must_use]
    pub fn finish(&self, candidate: Candidate, enrichment_error: Option<String>) -> Assembly {
        for field in Field::ALL {
            self.extractor.report_exhausted(&candidate, field);
        }

        let missing = candidate.missing_required();
        if missing.is_empty() {
            return Assembly::Complete(candidate);
        }

        let rejection = if candidate.detail_enriched() {
            Rejection::DetailEnrichmentFailed {
                missing,
                cause: enrichment_error
                    .unwrap_or_else(|| "detail page did not resolve the missing fields".to_string()),
            }
        } else {
            Rejection::RequiredFieldMissing { fields: missing }
        };
        Assembly::Rejected(candidate, rejection)
    }
}
