//! Search results page handling.
//!
//! Turns a fetched search page into ordered candidate payloads. The embedded
//! search blob is preferred; when it is missing or unreadable the product
//! tiles (`div[data-item-id]`) are used instead. A page that yields nothing
//! and looks like an anti-bot interstitial is reported as blocked rather
//! than as an empty result page.

use url::Url;

use crate::candidate::RawPayload;
use crate::capabilities::FetchError;
use crate::dom;
use crate::patterns::BLOCK_PAGE_MARKER;
use crate::structured;

/// Product tile container on search pages.
const CARD_SELECTOR: &str = "div[data-item-id]";

/// Where a page's candidates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    EmbeddedJson,
    DomCards,
    /// No candidates found; the page is a genuine empty result.
    Empty,
}

/// Candidates of one search page, in page order.
#[derive(Debug, Clone)]
pub struct SplitPage {
    pub payloads: Vec<RawPayload>,
    pub source: PageSource,
    /// Non-product entries skipped in the embedded blob.
    pub skipped: usize,
    /// Why the embedded blob was unusable, when the page fell back to tiles.
    pub embedded_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page is an anti-bot interstitial (marker: {marker})")]
    Blocked { marker: String },
}

impl From<PageError> for FetchError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Blocked { marker } => FetchError::Blocked { marker },
        }
    }
}

/// Split a search results page into candidate payloads.
pub fn split_candidates(html: &str, page_url: Option<&str>) -> Result<SplitPage, PageError> {
    let doc = dom::parse(html);
    let tag = |payload: RawPayload| match page_url {
        Some(url) => payload.with_page_url(url),
        None => payload,
    };

    let embedded_error = match structured::search_items(&doc) {
        Ok(Some(items)) if !items.products.is_empty() => {
            let payloads = items
                .products
                .iter()
                .map(|item| tag(RawPayload::json(item.to_string())))
                .collect();
            return Ok(SplitPage {
                payloads,
                source: PageSource::EmbeddedJson,
                skipped: items.skipped,
                embedded_error: None,
            });
        }
        Ok(_) => None,
        Err(e) => Some(e.to_string()),
    };

    let payloads: Vec<RawPayload> = dom::select_all(&doc, CARD_SELECTOR)
        .iter()
        .map(|card| tag(RawPayload::html(dom::outer_html(card))))
        .collect();

    if !payloads.is_empty() {
        return Ok(SplitPage {
            payloads,
            source: PageSource::DomCards,
            skipped: 0,
            embedded_error,
        });
    }

    if let Some(marker) = detect_block_page(html) {
        return Err(PageError::Blocked { marker });
    }

    Ok(SplitPage {
        payloads: Vec::new(),
        source: PageSource::Empty,
        skipped: 0,
        embedded_error,
    })
}

/// The first anti-bot marker found in a page body, lower-cased.
#[must_use]
pub fn detect_block_page(html: &str) -> Option<String> {
    BLOCK_PAGE_MARKER
        .find(html)
        .map(|m| m.as_str().to_lowercase())
}

/// `<base>/search?q=<term>&page=<n>`.
#[must_use]
pub fn search_url(base: &Url, term: &str, page: u32) -> Url {
    let mut url = base.clone();
    url.set_path("/search");
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("q", term)
        .append_pair("page", &page.to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_markers() {
        assert_eq!(
            detect_block_page("<title>Robot or human?</title>"),
            Some("robot or human".to_string())
        );
        assert_eq!(
            detect_block_page(r#"<script src="https://client.px-cloud.net/x.js"></script>"#),
            Some("px-cloud".to_string())
        );
        assert_eq!(detect_block_page("<html><body><div>normal content</div></body></html>"), None);
    }

    #[test]
    fn test_search_url() {
        let base = Url::parse("https://www.walmart.com/").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            search_url(&base, "leather wallet", 2).as_str(),
            "https://www.walmart.com/search?q=leather+wallet&page=2"
        );
    }

    #[test]
    fn test_blocked_page_without_candidates() {
        let html = "<html><body><h1>Please verify you are a human</h1><div id='px-captcha'></div></body></html>";
        assert_eq!(
            split_candidates(html, None).err(),
            Some(PageError::Blocked { marker: "please verify".to_string() })
        );
    }

    #[test]
    fn test_generic_markers_need_title_or_widget() {
        assert_eq!(
            detect_block_page("<html><head><title>Security Challenge</title></head><body></body></html>"),
            Some("<title>security challenge</title>".to_string())
        );
        assert_eq!(
            detect_block_page(r#"<div class="g-recaptcha" data-sitekey="x"></div>"#),
            Some("g-recaptcha".to_string())
        );
        assert_eq!(detect_block_page("<p>captcha solver keychain</p>"), None);
    }

    #[test]
    fn test_echoed_search_term_is_not_a_block() {
        let html = r#"<html><head><title>challenge coin - Walmart.com</title></head>
            <body><h1>Results for "challenge coin captcha"</h1><p>No results found.</p></body></html>"#;
        let page = split_candidates(html, None).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(page.source, PageSource::Empty);
    }

    #[test]
    fn test_empty_results_page() {
        let page = split_candidates("<html><body><p>No results for \"zzz\"</p></body></html>", None)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(page.source, PageSource::Empty);
        assert!(page.payloads.is_empty());
    }
}
