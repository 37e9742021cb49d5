//! Compiled regex patterns used during extraction.
//!
//! All patterns are compiled once at first use using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Price Patterns
// =============================================================================

/// First number in a price label, separators included. `"Now $1,299.00"`
/// matches `1,299.00` and `"1.299,00 €"` matches `1.299,00`.
pub static PRICE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d(?:[\d,.]*\d)?|\.\d+").expect("PRICE_NUMBER regex")
});

/// Cents-only labels such as `"97¢"` or `"97 cents"`.
pub static PRICE_CENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})\s*(?:¢|c\b|cents?\b)").expect("PRICE_CENTS regex")
});

// =============================================================================
// Text Cleanup
// =============================================================================

/// Runs of whitespace (including newlines and nbsp) collapsed to one space.
pub static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\u{a0}]+").expect("WHITESPACE_RUN regex")
});

// =============================================================================
// Block / Challenge Page Detection
// =============================================================================

/// Markers of anti-bot interstitials. Matched case-insensitively against the
/// whole response body. Generic words (`captcha`, `challenge`) only count
/// as the whole page title or as widget ids, since results pages echo the
/// search term in both title and body.
pub static BLOCK_PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(robot or human|are you a robot|please verify|/blocked\?url=|px-cloud|px-captcha|g-recaptcha|h-captcha|<title>\s*(?:security |human |bot )?(?:captcha|challenge)(?: page| required)?\s*</title>)",
    )
    .expect("BLOCK_PAGE_MARKER regex")
});

/// Collapse whitespace and trim. Returns `None` for text that is empty
/// afterwards.
#[must_use]
pub fn clean_text(text: &str) -> Option<String> {
    let cleaned = WHITESPACE_RUN.replace_all(text, " ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
