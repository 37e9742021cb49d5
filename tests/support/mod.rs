//! Stub capabilities and payload builders shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rs_product_harvest::{
    Candidate, CollectRequest, Collector, DetailFetcher, DiagnosticEvent, FetchError, MemorySink, PageFetcher,
    RawPayload, RunContext,
};

pub const PAGE_URL: &str = "https://www.walmart.com/search?q=wallet";

/// Serves fixed pages; pages not configured come back empty.
#[derive(Default)]
pub struct StubPages {
    pages: HashMap<u32, Result<Vec<RawPayload>, FetchError>>,
    calls: Mutex<Vec<u32>>,
}

impl StubPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, index: u32, payloads: Vec<RawPayload>) -> Self {
        self.pages.insert(index, Ok(payloads));
        self
    }

    pub fn failing(mut self, index: u32, error: FetchError) -> Self {
        self.pages.insert(index, Err(error));
        self
    }

    /// Page indices requested, in order.
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl PageFetcher for StubPages {
    async fn fetch_page(&self, _ctx: &RunContext, page: u32) -> Result<Vec<RawPayload>, FetchError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(page);
        self.pages.get(&page).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Serves detail pages by product link.
#[derive(Default)]
pub struct StubDetails {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl StubDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, link: &str, html: &str) -> Self {
        self.pages.insert(link.to_string(), html.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl DetailFetcher for StubDetails {
    async fn fetch_detail(&self, candidate: &Candidate) -> Result<RawPayload, FetchError> {
        let link = candidate.link().unwrap_or_default().to_string();
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(link.clone());
        match self.pages.get(&link) {
            Some(html) => Ok(RawPayload::html(html.clone()).with_page_url(link)),
            None => Err(FetchError::Crash {
                status: Some(1),
                stderr: format!("no detail page for {link}"),
            }),
        }
    }
}

/// Embedded search item as the page splitter would produce it.
pub fn item(id: u32, name: &str, price: &str) -> RawPayload {
    item_with_link(id, name, price, &format!("/ip/{}/{id}", name.replace(' ', "-")))
}

pub fn item_with_link(id: u32, name: &str, price: &str, link: &str) -> RawPayload {
    let body = serde_json::json!({
        "__typename": "Product",
        "usItemId": id.to_string(),
        "name": name,
        "canonicalUrl": link,
        "image": format!("https://i5.walmartimages.com/seo/{id}.jpeg"),
        "priceInfo": {"currentPrice": {"price": price.parse::<f64>().unwrap_or_else(|e| panic!("{e}"))}},
        "fulfillmentBadge": "Free shipping, arrives in 2 days"
    });
    RawPayload::json(body.to_string()).with_page_url(PAGE_URL)
}

/// Search result tile markup.
pub fn card(id: u32, name: &str, price_label: &str) -> RawPayload {
    let html = format!(
        r#"<div data-item-id="{id}">
            <a href="/ip/{slug}/{id}"><span data-automation-id="product-title">{name}</span></a>
            <img data-testid="productTileImage" src="https://i5.walmartimages.com/seo/{id}.jpeg">
            <div data-automation-id="product-price"><div>{price_label}</div></div>
        </div>"#,
        slug = name.replace(' ', "-"),
    );
    RawPayload::html(html).with_page_url(PAGE_URL)
}

pub fn collector(pages: Arc<StubPages>, sink: Arc<MemorySink>) -> Collector {
    Collector::new(pages).with_sink(sink)
}

pub async fn run(collector: &Collector, request: CollectRequest) -> rs_product_harvest::CollectionResult {
    collector.collect(request).await.unwrap_or_else(|e| panic!("{e}"))
}

pub fn count_events(sink: &MemorySink, pred: impl Fn(&DiagnosticEvent) -> bool) -> usize {
    sink.events().iter().filter(|e| pred(e)).count()
}
