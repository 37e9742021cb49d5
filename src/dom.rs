//! DOM Operations Adapter
//!
//! Small helpers over the `dom_query` crate used by the selector strategies
//! and the search page splitter.

// Re-export core types for external use
pub use dom_query::{Document, Selection};

use crate::patterns;

/// Parse an HTML document or fragment.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Get an attribute value, trimmed. Empty values count as absent.
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    let value = sel.attr(name)?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Text content of the selection with whitespace collapsed.
#[must_use]
pub fn clean_text(sel: &Selection) -> Option<String> {
    patterns::clean_text(&sel.text())
}

/// Outer HTML of the selection.
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> String {
    sel.html().to_string()
}

/// Matches of `selector` anywhere in `doc`, as individual selections, in
/// document order.
pub fn select_all<'a>(doc: &'a Document, selector: &str) -> Vec<Selection<'a>> {
    doc.select(selector)
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .collect()
}

/// First URL of a `srcset` attribute (`"a.jpg 1x, b.jpg 2x"` -> `"a.jpg"`).
#[must_use]
pub fn first_srcset_url(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .next()
        .and_then(|entry| entry.split_whitespace().next())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_attribute_trims_and_drops_empty() {
        let doc = parse(r#"<img src="  /a.jpg " alt="">"#);
        let img = doc.select("img");

        assert_eq!(get_attribute(&img, "src"), Some("/a.jpg".to_string()));
        assert_eq!(get_attribute(&img, "alt"), None);
        assert_eq!(get_attribute(&img, "title"), None);
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let doc = parse("<div><span>Free</span>\n   <b>shipping</b></div>");
        assert_eq!(clean_text(&doc.select("div")), Some("Free shipping".to_string()));
    }

    #[test]
    fn test_select_all_searches_whole_document() {
        let doc = parse(r#"<div data-item-id="1"><a href="/ip/1">A</a></div><p><a href="/ip/2">B</a></p>"#);
        let links: Vec<String> = select_all(&doc, "a")
            .iter()
            .filter_map(|a| get_attribute(a, "href"))
            .collect();
        assert_eq!(links, vec!["/ip/1", "/ip/2"]);
        assert!(select_all(&doc, "span").is_empty());
    }

    #[test]
    fn test_first_srcset_url() {
        assert_eq!(first_srcset_url("a.jpg 1x, b.jpg 2x"), Some("a.jpg".to_string()));
        assert_eq!(first_srcset_url(" https://x/y.png 480w"), Some("https://x/y.png".to_string()));
        assert_eq!(first_srcset_url(""), None);
    }
}
