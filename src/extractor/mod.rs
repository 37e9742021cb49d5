//! Field extraction.
//!
//! Runs a field's strategy chain against a parsed payload, stopping at the
//! first success. Every try is recorded on the candidate and reported as a
//! diagnostic; moving from one tier to the next is reported on its own.

pub mod field;
pub mod price;
pub mod strategy;
pub mod view;

pub use field::{field_list, AttemptOutcome, ExtractMode, Field, FieldAttempt, FieldValue, Tier};
pub use price::parse_price;
pub use strategy::{normalize, Locator, RawValue, Strategy};
pub use view::PayloadView;

use crate::candidate::Candidate;
use crate::diagnostics::{DiagnosticEvent, RunDiagnostics};

/// Applies strategy chains to candidates, reporting through a run's
/// diagnostics handle.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor<'d> {
    diag: &'d RunDiagnostics,
}

impl<'d> FieldExtractor<'d> {
    #[must_use]
    pub const fn new(diag: &'d RunDiagnostics) -> Self {
        Self { diag }
    }

    /// Try `chain` for `field` until one strategy succeeds.
    ///
    /// Does nothing when the field is already resolved. Attempt indices
    /// continue from any earlier pass over the same candidate, so a detail
    /// page pass numbers its tries after the card's. Returns whether the
    /// field is resolved afterwards.
    pub fn extract(
        &self,
        candidate: &mut Candidate,
        view: &PayloadView,
        field: Field,
        chain: &[Strategy],
    ) -> bool {
        if candidate.is_resolved(field) {
            return true;
        }

        for strategy in chain {
            let previous = candidate.attempts_for(field).last().map(|a| a.tier);
            let index = u32::try_from(candidate.attempts_for(field).count())
                .unwrap_or(u32::MAX)
                .saturating_add(1);

            if let Some(from) = previous.filter(|t| *t != strategy.tier) {
                self.diag.emit(DiagnosticEvent::StrategyTransition {
                    candidate: candidate.position,
                    field,
                    from,
                    to: strategy.tier,
                });
            }

            let outcome = match strategy
                .probe(view)
                .and_then(|raw| normalize(field, raw, view.base()))
            {
                Ok(value) => AttemptOutcome::Success { value },
                Err(reason) => AttemptOutcome::Failure { reason },
            };

            let attempt = FieldAttempt {
                field,
                index,
                tier: strategy.tier,
                locator: strategy.describe(),
                mode: strategy.mode,
                outcome,
            };
            self.diag.emit(DiagnosticEvent::FieldAttempted {
                candidate: candidate.position,
                attempt: attempt.clone(),
            });

            let resolved = match &attempt.outcome {
                AttemptOutcome::Success { value } => Some(value.clone()),
                AttemptOutcome::Failure { .. } => None,
            };
            candidate.record_attempt(attempt);

            if let Some(value) = resolved {
                candidate.resolve(field, value, strategy.tier);
                return true;
            }
        }

        false
    }

    /// Report a field that no strategy could resolve. Called once, after the
    /// last pass that could have resolved it.
    pub fn report_exhausted(&self, candidate: &Candidate, field: Field) {
        if candidate.is_resolved(field) {
            return;
        }
        let attempts = candidate.attempts_for(field).count();
        self.diag.emit(DiagnosticEvent::FieldExhausted {
            candidate: candidate.position,
            field,
            attempts,
            required: field.is_required(),
            message: format!("field {field}: all {attempts} strategies failed"),
        });
    }
}
