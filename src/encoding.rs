//! Character set handling for fetched page bodies.
//!
//! Fetch capabilities hand over raw bytes (a saved page, a crawler's output
//! file). Before splitting a page into candidates it is decoded to UTF-8 using,
//! in order: a byte order mark, the transport's `Content-Type` charset, the
//! document's own `<meta>` declaration, then UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// `charset=` inside a meta tag, either `<meta charset>` or the http-equiv form.
#[allow(clippy::expect_used)]
static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?([A-Za-z0-9._:-]+)"#).expect("valid regex")
});

/// `charset=` parameter of a `Content-Type` header value.
#[allow(clippy::expect_used)]
static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9._:-]+)"#).expect("valid regex")
});

/// Number of leading bytes inspected for a `<meta>` charset.
const SNIFF_LEN: usize = 2048;

fn label_to_encoding(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Determine the encoding of a page body.
#[must_use]
pub fn detect_encoding(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    if let Some(encoding) = content_type
        .and_then(|ct| HEADER_CHARSET_RE.captures(ct))
        .and_then(|c| c.get(1))
        .and_then(|m| label_to_encoding(m.as_str()))
    {
        return encoding;
    }

    let head = String::from_utf8_lossy(&body[..body.len().min(SNIFF_LEN)]);
    META_CHARSET_RE
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| label_to_encoding(m.as_str()))
        .unwrap_or(UTF_8)
}

/// Decode a page body to a UTF-8 string.
///
/// Invalid sequences become U+FFFD rather than failing; a page that is mostly
/// garbage still gets split and its candidates fail extraction individually.
#[must_use]
pub fn decode_page(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(body, content_type);
    let (decoded, _used, _had_errors) = encoding.decode(body);
    decoded.into_owned()
}
