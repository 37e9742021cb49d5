//! Collection controller.
//!
//! Drives one run: requests search pages through the injected fetcher, runs
//! each candidate through assembly, deduplication and the price filter, and
//! stops at the requested count or the first hard stop. Runs are sequential
//! internally and share nothing, so one `Collector` can serve concurrent
//! `collect` calls.

pub mod context;
pub mod state;

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use url::Url;

use crate::assembler::{Assembly, ProductAssembler};
use crate::candidate::{Candidate, CandidateRef, RawPayload};
use crate::capabilities::{DetailFetcher, NullRawStore, PageFetcher, RawRecord, RawStore};
use crate::dedup::Deduplicator;
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink, RunDiagnostics, TracingSink};
use crate::error::{Error, Result};
use crate::filter::{PriceBounds, PriceFilter};
use crate::options::{HardStops, Options};
use crate::rejection::Rejection;
use crate::result::{AcceptedProduct, CollectionResult, TerminationReason};

pub use context::{RunContext, RunId};
pub use state::RunState;

use state::hard_stop_reached;

/// Parameters of one `collect` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectRequest {
    pub term: String,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Number of products wanted (N).
    pub count: usize,
    pub hard_stops: HardStops,
}

impl CollectRequest {
    #[must_use]
    pub fn new(term: impl Into<String>, count: usize) -> Self {
        Self {
            term: term.into(),
            min_price: None,
            max_price: None,
            count,
            hard_stops: HardStops::default(),
        }
    }

    #[must_use]
    pub const fn with_bounds(mut self, min_price: Option<Decimal>, max_price: Option<Decimal>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    #[must_use]
    pub const fn with_hard_stops(mut self, hard_stops: HardStops) -> Self {
        self.hard_stops = hard_stops;
        self
    }

    #[must_use]
    pub const fn bounds(&self) -> PriceBounds {
        PriceBounds::new(self.min_price, self.max_price)
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::invalid("requested count must be greater than zero"));
        }
        if self.term.trim().is_empty() {
            return Err(Error::invalid("search term must not be empty"));
        }
        self.bounds().validate()?;
        self.hard_stops.validate()
    }
}

/// Runs collections against injected capabilities.
pub struct Collector {
    pages: Arc<dyn PageFetcher>,
    detail: Option<Arc<dyn DetailFetcher>>,
    sink: Arc<dyn DiagnosticSink>,
    raw_store: Arc<dyn RawStore>,
    options: Options,
}

impl Collector {
    /// Collector with default options, `tracing` diagnostics, no detail
    /// fetcher and no raw persistence.
    #[must_use]
    pub fn new(pages: Arc<dyn PageFetcher>) -> Self {
        Self {
            pages,
            detail: None,
            sink: Arc::new(TracingSink),
            raw_store: Arc::new(NullRawStore),
            options: Options::default(),
        }
    }

    #[must_use]
    pub fn with_detail_fetcher(mut self, detail: Arc<dyn DetailFetcher>) -> Self {
        self.detail = Some(detail);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_raw_store(mut self, raw_store: Arc<dyn RawStore>) -> Self {
        self.raw_store = raw_store;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Collect up to `request.count` products.
    ///
    /// Fails only for an invalid request, before any fetch. Falling short of
    /// the requested count is a normal result with a non-zero shortfall.
    pub async fn collect(&self, request: CollectRequest) -> Result<CollectionResult> {
        request.validate()?;
        let base = Url::parse(&self.options.base_url)
            .map_err(|e| Error::Options(format!("base_url {:?}: {e}", self.options.base_url)))?;

        let mut ctx = RunContext::new(request.term.clone(), request.count, request.bounds());
        let diag = RunDiagnostics::for_run(ctx.run_id(), Arc::clone(&self.sink));
        let stops = request.hard_stops;

        diag.emit(DiagnosticEvent::RunStarted {
            term: ctx.term().to_string(),
            requested: ctx.requested(),
            min_price: request.min_price,
            max_price: request.max_price,
            max_pages: stops.max_pages,
            max_attempts: stops.max_attempts,
        });

        let assembler = ProductAssembler::new(&diag, self.options.enrichment, Some(&base));
        let filter = PriceFilter::new(ctx.bounds());
        let mut dedup = Deduplicator::new(self.options.extra_tracking_params.clone());
        let mut products: Vec<AcceptedProduct> = Vec::new();

        let mut state = RunState::Init;
        while !state.is_terminal() {
            state = match state {
                RunState::Init => RunState::Searching,
                RunState::Searching => match hard_stop_reached(&ctx, stops) {
                    Some(hard_stop) => RunState::Shortfall(hard_stop),
                    None => {
                        let page = ctx.next_page();
                        let payloads = self.fetch_page(&mut ctx, &diag, page, stops).await;
                        RunState::Paging { page, payloads }
                    }
                },
                RunState::Paging { page, payloads } => {
                    let total = payloads.len();
                    for (i, raw) in payloads.into_iter().enumerate() {
                        if products.len() >= ctx.requested() {
                            diag.emit(DiagnosticEvent::CandidatesSkipped {
                                page,
                                count: total - i,
                            });
                            break;
                        }

                        let candidate = Candidate::new(CandidateRef { page, index: i + 1 }, raw);
                        match assembler.assemble(candidate, self.detail.as_deref()).await {
                            Assembly::Complete(candidate) => {
                                self.admit(candidate, &ctx, &diag, &filter, &mut dedup, &mut products)
                                    .await;
                            }
                            Assembly::Rejected(candidate, rejection) => {
                                self.reject(candidate, rejection, &diag).await;
                            }
                        }
                    }
                    RunState::after_page(products.len(), ctx.requested())
                }
                terminal @ (RunState::Done | RunState::Shortfall(_)) => terminal,
            };
        }

        let termination = state.termination().unwrap_or(TerminationReason::Done);
        let collected = products.len();
        let shortfall = ctx.requested().saturating_sub(collected);

        diag.emit(DiagnosticEvent::RunFinished {
            requested: ctx.requested(),
            collected,
            attempts: ctx.attempts(),
            pages: ctx.pages(),
            shortfall,
            termination,
            elapsed_ms: ctx.elapsed_ms(),
        });

        Ok(CollectionResult {
            run_id: ctx.run_id(),
            products,
            requested: ctx.requested(),
            collected,
            attempts: ctx.attempts(),
            pages: ctx.pages(),
            shortfall,
            termination,
        })
    }

    /// Request one page index, retrying per options. A page whose every
    /// request failed is treated as empty.
    async fn fetch_page(
        &self,
        ctx: &mut RunContext,
        diag: &RunDiagnostics,
        page: u32,
        stops: HardStops,
    ) -> Vec<RawPayload> {
        let mut tries_left = self.options.retries_per_page;
        loop {
            let attempt = ctx.record_attempt();
            diag.emit(DiagnosticEvent::PageRequested { page, attempt });

            match self.pages.fetch_page(ctx, page).await {
                Ok(payloads) => {
                    diag.emit(DiagnosticEvent::PageFetched {
                        page,
                        candidates: payloads.len(),
                    });
                    return payloads;
                }
                Err(e) => {
                    let retrying = tries_left > 0 && ctx.attempts() < stops.max_attempts;
                    diag.emit(DiagnosticEvent::PageFailed {
                        page,
                        attempt,
                        category: e.category(),
                        reason: e.to_string(),
                        retrying,
                    });
                    if !retrying {
                        return Vec::new();
                    }
                    tries_left -= 1;
                }
            }
        }
    }

    /// Dedup check, price filter, then acceptance.
    async fn admit(
        &self,
        candidate: Candidate,
        ctx: &RunContext,
        diag: &RunDiagnostics,
        filter: &PriceFilter,
        dedup: &mut Deduplicator,
        products: &mut Vec<AcceptedProduct>,
    ) {
        let (Some(link), Some(price)) = (candidate.link().map(str::to_string), candidate.price()) else {
            let fields = candidate.missing_required();
            self.reject(candidate, Rejection::RequiredFieldMissing { fields }, diag)
                .await;
            return;
        };

        let canonical = match dedup.check(&link) {
            Ok(canonical) => canonical,
            Err(rejection) => return self.reject(candidate, rejection, diag).await,
        };
        if let Err(rejection) = filter.check(price) {
            return self.reject(candidate, rejection, diag).await;
        }

        let Some(product) = AcceptedProduct::from_candidate(&candidate, canonical) else {
            let fields = candidate.missing_required();
            return self
                .reject(candidate, Rejection::RequiredFieldMissing { fields }, diag)
                .await;
        };
        let position = candidate.position;
        dedup.admit(&link);
        products.push(product);

        diag.emit(DiagnosticEvent::CandidateAccepted {
            candidate: position,
            link,
            price,
            collected: products.len(),
            requested: ctx.requested(),
        });
    }

    /// Report a rejection and hand the raw payload to the store.
    async fn reject(&self, candidate: Candidate, rejection: Rejection, diag: &RunDiagnostics) {
        diag.emit(DiagnosticEvent::CandidateRejected {
            candidate: candidate.position,
            reason: rejection.clone(),
        });

        if !self.options.persist_rejected {
            return;
        }

        let record = RawRecord {
            run_id: diag.run_id(),
            at: Utc::now(),
            candidate: candidate.position,
            reason: rejection.code().to_string(),
            message: rejection.to_string(),
            missing: rejection.missing_fields().to_vec(),
            link: candidate.link().map(str::to_string),
            raw: candidate.raw,
            detail_raw: candidate.detail_raw,
        };
        if let Err(e) = self.raw_store.persist(&record).await {
            diag.emit(DiagnosticEvent::RawPersistFailed {
                candidate: record.candidate,
                error: e.to_string(),
            });
        }
    }
}
