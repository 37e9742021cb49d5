//! Run diagnostics.
//!
//! The collector reports everything it decides as a `DiagnosticEvent`: each
//! field attempt, tier transitions, every accept and reject verdict, page
//! fetch outcomes and the final run summary. Events go to a
//! `DiagnosticSink`; emitting is fire-and-forget and can never fail a run.
//!
//! `TracingSink` is the default and forwards to `tracing`. `MemorySink` keeps
//! the events for tests or for callers that want the run log as data.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::candidate::CandidateRef;
use crate::capabilities::FailureCategory;
use crate::collector::context::RunId;
use crate::extractor::{Field, FieldAttempt, Tier};
use crate::rejection::Rejection;
use crate::result::TerminationReason;

/// Something the collector wants reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    RunStarted {
        term: String,
        requested: usize,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        max_pages: u32,
        max_attempts: u32,
    },
    PageRequested {
        page: u32,
        attempt: u32,
    },
    PageFetched {
        page: u32,
        candidates: usize,
    },
    PageFailed {
        page: u32,
        attempt: u32,
        category: FailureCategory,
        reason: String,
        /// Whether another request for the same page follows.
        retrying: bool,
    },
    FieldAttempted {
        candidate: CandidateRef,
        attempt: FieldAttempt,
    },
    StrategyTransition {
        candidate: CandidateRef,
        field: Field,
        from: Tier,
        to: Tier,
    },
    FieldExhausted {
        candidate: CandidateRef,
        field: Field,
        attempts: usize,
        required: bool,
        message: String,
    },
    EnrichmentRequested {
        candidate: CandidateRef,
        link: String,
        missing: Vec<Field>,
    },
    EnrichmentFinished {
        candidate: CandidateRef,
        resolved: Vec<Field>,
        error: Option<String>,
    },
    CandidateAccepted {
        candidate: CandidateRef,
        link: String,
        price: Decimal,
        collected: usize,
        requested: usize,
    },
    CandidateRejected {
        candidate: CandidateRef,
        reason: Rejection,
    },
    CandidatesSkipped {
        page: u32,
        count: usize,
    },
    RawPersistFailed {
        candidate: CandidateRef,
        error: String,
    },
    RunFinished {
        requested: usize,
        collected: usize,
        attempts: u32,
        pages: u32,
        shortfall: usize,
        termination: TerminationReason,
        elapsed_ms: i64,
    },
}

/// An event stamped with its run and time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub run_id: RunId,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: DiagnosticEvent,
}

/// Destination for diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, record: &DiagnosticRecord);
}

/// Forwards records to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, record: &DiagnosticRecord) {
        let run_id = record.run_id;
        match &record.event {
            DiagnosticEvent::RunStarted {
                term,
                requested,
                min_price,
                max_price,
                max_pages,
                max_attempts,
            } => tracing::info!(
                %run_id, term = %term, requested, min_price = ?min_price, max_price = ?max_price,
                max_pages, max_attempts, "collection run started"
            ),
            DiagnosticEvent::PageRequested { page, attempt } => {
                tracing::info!(%run_id, page, attempt, "requesting search page");
            }
            DiagnosticEvent::PageFetched { page, candidates } => {
                tracing::info!(%run_id, page, candidates, "search page fetched");
            }
            DiagnosticEvent::PageFailed {
                page,
                attempt,
                category,
                reason,
                retrying,
            } => tracing::error!(
                %run_id, page, attempt, category = %category, reason = %reason, retrying,
                "search page fetch failed"
            ),
            DiagnosticEvent::FieldAttempted { candidate, attempt } => match &attempt.outcome {
                crate::extractor::AttemptOutcome::Success { value } => tracing::debug!(
                    %run_id, candidate = %candidate, field = %attempt.field, index = attempt.index,
                    tier = %attempt.tier, locator = %attempt.locator, value = %value.preview(),
                    "field attempt succeeded"
                ),
                crate::extractor::AttemptOutcome::Failure { reason } => tracing::debug!(
                    %run_id, candidate = %candidate, field = %attempt.field, index = attempt.index,
                    tier = %attempt.tier, locator = %attempt.locator, reason = %reason,
                    "field attempt failed"
                ),
            },
            DiagnosticEvent::StrategyTransition {
                candidate,
                field,
                from,
                to,
            } => tracing::debug!(
                %run_id, candidate = %candidate, field = %field, from = %from, to = %to,
                "strategy tier transition"
            ),
            DiagnosticEvent::FieldExhausted {
                candidate,
                required,
                message,
                ..
            } => {
                if *required {
                    tracing::warn!(%run_id, candidate = %candidate, "{message}");
                } else {
                    tracing::debug!(%run_id, candidate = %candidate, "{message}");
                }
            }
            DiagnosticEvent::EnrichmentRequested {
                candidate,
                link,
                missing,
            } => tracing::info!(
                %run_id, candidate = %candidate, link = %link,
                missing = %crate::extractor::field_list(missing), "requesting detail page"
            ),
            DiagnosticEvent::EnrichmentFinished {
                candidate,
                resolved,
                error,
            } => match error {
                Some(error) => tracing::warn!(
                    %run_id, candidate = %candidate, error = %error, "detail enrichment failed"
                ),
                None => tracing::info!(
                    %run_id, candidate = %candidate,
                    resolved = %crate::extractor::field_list(resolved), "detail enrichment finished"
                ),
            },
            DiagnosticEvent::CandidateAccepted {
                candidate,
                link,
                price,
                collected,
                requested,
            } => tracing::info!(
                %run_id, candidate = %candidate, link = %link, price = %price,
                "candidate accepted collected={collected}/{requested}"
            ),
            DiagnosticEvent::CandidateRejected { candidate, reason } => tracing::warn!(
                %run_id, candidate = %candidate, code = reason.code(), reason = %reason,
                "candidate rejected"
            ),
            DiagnosticEvent::CandidatesSkipped { page, count } => tracing::info!(
                %run_id, page, count, "target reached; remaining candidates on page not evaluated"
            ),
            DiagnosticEvent::RawPersistFailed { candidate, error } => tracing::warn!(
                %run_id, candidate = %candidate, error = %error, "raw payload persistence failed"
            ),
            DiagnosticEvent::RunFinished {
                requested,
                collected,
                attempts,
                pages,
                shortfall,
                termination,
                elapsed_ms,
            } => tracing::info!(
                %run_id, requested, collected, attempts, pages, shortfall,
                termination = %termination, elapsed_ms, "collection run finished"
            ),
        }
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.records().into_iter().map(|r| r.event).collect()
    }

    /// Rejection reasons in the order they were reported.
    #[must_use]
    pub fn rejections(&self) -> Vec<Rejection> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DiagnosticEvent::CandidateRejected { reason, .. } => Some(reason),
                _ => None,
            })
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, record: &DiagnosticRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

/// Sends each record to several sinks.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl FanoutSink {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn DiagnosticSink>>) -> Self {
        Self { sinks }
    }
}

impl DiagnosticSink for FanoutSink {
    fn emit(&self, record: &DiagnosticRecord) {
        for sink in &self.sinks {
            sink.emit(record);
        }
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _record: &DiagnosticRecord) {}
}

/// A run's handle on its sink. Stamps every event with the run id.
#[derive(Clone)]
pub struct RunDiagnostics {
    run_id: RunId,
    sink: Arc<dyn DiagnosticSink>,
}

impl RunDiagnostics {
    /// Handle with a fresh run id, for extraction outside a collection run.
    #[must_use]
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::for_run(RunId::new(), sink)
    }

    #[must_use]
    pub fn for_run(run_id: RunId, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { run_id, sink }
    }

    /// Handle that discards everything.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(Arc::new(NullSink))
    }

    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn emit(&self, event: DiagnosticEvent) {
        self.sink.emit(&DiagnosticRecord {
            run_id: self.run_id,
            at: Utc::now(),
            event,
        });
    }
}

impl fmt::Debug for RunDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunDiagnostics")
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}
