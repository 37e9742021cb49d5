//! # rs-product-harvest
//!
//! Fallback-driven product record extraction and target-count collection for
//! e-commerce search pages whose markup changes often and which sometimes
//! answer with anti-bot interstitials instead of results.
//!
//! Every field of a product record (name, price, image, link, plus optional
//! images, shipping and description) is resolved by an ordered chain of
//! strategies: embedded structured data first, DOM selectors next, and the
//! product's own detail page last. Every try is recorded. A run keeps
//! requesting result pages until exactly the requested number of valid,
//! in-bounds, non-duplicate products is collected or a caller hard stop is
//! hit, in which case the shortfall is reported.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_product_harvest::{extract_candidate, Assembly, Options, RawPayload};
//!
//! let card = RawPayload::html(r#"<div data-item-id="1">
//!     <a href="/ip/Slim-Wallet/1"><span data-automation-id="product-title">Slim Wallet</span></a>
//!     <img data-testid="productTileImage" src="https://i5.walmartimages.com/1.jpg">
//!     <div data-automation-id="product-price"><div>current price $19.99</div></div>
//! </div>"#);
//!
//! match extract_candidate(card, &Options::default()) {
//!     Assembly::Complete(candidate) => assert_eq!(candidate.price().map(|p| p.to_string()), Some("19.99".into())),
//!     Assembly::Rejected(_, reason) => panic!("{reason}"),
//! }
//! ```
//!
//! Full runs go through [`Collector`] with an injected [`PageFetcher`].

mod error;
mod options;
mod patterns;
mod result;

/// Thin `dom_query` helpers.
pub mod dom;

/// Field vocabulary, strategies and the field extractor.
pub mod extractor;

/// Ordered strategy chains for cards and detail pages.
pub mod selector;

/// Embedded search blobs and schema.org JSON-LD.
pub mod structured;

/// Raw payloads and in-flight candidates.
pub mod candidate;

/// Candidate assembly and detail-page enrichment.
pub mod assembler;

/// Price bounds.
pub mod filter;

/// Canonical-link deduplication.
pub mod dedup;

/// Per-candidate rejection reasons.
pub mod rejection;

/// Collection controller and run context.
pub mod collector;

/// Structured run diagnostics.
pub mod diagnostics;

/// Injected fetch and persistence capabilities.
pub mod capabilities;

/// Search page splitting and block-page detection.
pub mod search_page;

/// URL validation, resolution and canonical links.
pub mod url_utils;

/// Character encoding detection and transcoding.
pub mod encoding;

use std::sync::Arc;

// Public API - re-exports
pub use assembler::{Assembly, ProductAssembler};
pub use candidate::{Candidate, CandidateRef, PayloadKind, RawPayload};
pub use capabilities::{
    DetailFetcher, FailureCategory, FetchError, JsonlRawStore, NullRawStore, PageFetcher, RawRecord, RawStore,
    StoreError,
};
pub use collector::{CollectRequest, Collector, RunContext, RunId};
pub use diagnostics::{
    DiagnosticEvent, DiagnosticRecord, DiagnosticSink, FanoutSink, MemorySink, NullSink, RunDiagnostics, TracingSink,
};
pub use error::{Error, Result};
pub use extractor::{AttemptOutcome, ExtractMode, Field, FieldAttempt, FieldValue, Tier};
pub use filter::PriceBounds;
pub use options::{EnrichmentPolicy, HardStops, Options};
pub use rejection::Rejection;
pub use result::{AcceptedProduct, CollectionResult, HardStop, TerminationReason};
pub use search_page::{PageError, PageSource, SplitPage};

/// Runs a collection with default options and `tracing` diagnostics.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use rs_product_harvest::{collect, CollectRequest, FetchError, PageFetcher, RawPayload, RunContext};
///
/// struct Fixtures;
///
/// #[async_trait::async_trait]
/// impl PageFetcher for Fixtures {
///     async fn fetch_page(&self, _ctx: &RunContext, _page: u32) -> Result<Vec<RawPayload>, FetchError> {
///         Ok(Vec::new())
///     }
/// }
///
/// # async fn run() -> rs_product_harvest::Result<()> {
/// let result = collect(Arc::new(Fixtures), CollectRequest::new("leather wallet", 3)).await?;
/// println!("collected {}/{} (shortfall {})", result.collected, result.requested, result.shortfall);
/// # Ok(())
/// # }
/// ```
pub async fn collect(pages: Arc<dyn PageFetcher>, request: CollectRequest) -> Result<CollectionResult> {
    Collector::new(pages).collect(request).await
}

/// Extracts one candidate from a raw payload using card chains only (no
/// detail-page enrichment, diagnostics discarded).
#[must_use]
pub fn extract_candidate(payload: RawPayload, options: &Options) -> Assembly {
    let diag = RunDiagnostics::detached();
    let base = url_utils::parse_url(&options.base_url);
    let assembler = ProductAssembler::new(&diag, options.enrichment, base.as_ref());

    let mut candidate = Candidate::new(CandidateRef { page: 1, index: 1 }, payload);
    assembler.extract_card(&mut candidate);
    assembler.finish(candidate, None)
}

/// Splits a fetched search page given as raw bytes, detecting its encoding
/// from the BOM, the `Content-Type` header or a meta declaration.
pub fn split_page_bytes(
    body: &[u8],
    content_type: Option<&str>,
    page_url: Option<&str>,
) -> std::result::Result<SplitPage, PageError> {
    let html = encoding::decode_page(body, content_type);
    search_page::split_candidates(&html, page_url)
}
