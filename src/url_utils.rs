//! URL Utility Functions
//!
//! URL validation and resolution for product links and image URLs, plus the
//! canonical-link normalization the deduplicator compares on.

use url::Url;

/// Query parameters that only carry tracking/attribution state. Two product
/// URLs differing only in these point at the same product.
pub const TRACKING_PARAMS: &[&str] = &[
    "gclid",
    "gclsrc",
    "dclid",
    "fbclid",
    "msclkid",
    "mc_cid",
    "mc_eid",
    "_ga",
    "ref",
    "ref_",
    "from",
    "sid",
    "veh",
    "wmlspartner",
    "affiliates_ad_id",
    "campaign_id",
    "adid",
    "adsredirect",
    "classtype",
    "selectedsellerid",
    "irgwc",
    "wl13",
    "wl0",
    // search placement badges and ad attribution
    "athbdg",
    "athcpid",
    "athpgid",
    "athznid",
    "athieid",
    "athstid",
    "athguid",
    "athwpid",
    "athcgid",
    "athancid",
    "athposb",
    "athena",
];

/// Tracking parameter prefixes (`utm_source`, `pf_rd_p`, ...).
const TRACKING_PREFIXES: &[&str] = &["utm_", "pf_rd_", "pd_rd_"];

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() {
        return (false, None);
    }

    // Must start with http:// or https://
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Convert a relative or absolute URL to absolute form.
///
/// Protocol-relative URLs (`//cdn.example.com/a.jpg`) take the base's scheme.
/// Returns `None` when the result is not an absolute http(s) URL.
#[must_use]
pub fn resolve_url(url_str: &str, base: Option<&Url>) -> Option<Url> {
    let url_str = url_str.trim();

    if url_str.is_empty() {
        return None;
    }

    if let (true, Some(url)) = is_absolute_url(url_str) {
        return Some(url);
    }

    // data:, javascript:, mailto: and friends are never product URLs
    if url_str.contains(':') && !url_str.starts_with('/') && Url::parse(url_str).is_ok() {
        return None;
    }

    let resolved = base?.join(url_str).ok()?;
    match resolved.scheme() {
        "http" | "https" if resolved.host().is_some() => Some(resolved),
        _ => None,
    }
}

/// Parse a URL string into a Url object.
///
/// # Returns
/// * `Some(Url)` if valid absolute URL, `None` otherwise
#[must_use]
pub fn parse_url(url_str: &str) -> Option<Url> {
    let (is_abs, parsed) = is_absolute_url(url_str);
    if is_abs {
        parsed
    } else {
        None
    }
}

/// Whether a query parameter name is a tracking parameter.
///
/// `extra` lets callers extend the built-in list; comparison is
/// case-insensitive.
#[must_use]
pub fn is_tracking_param(name: &str, extra: &[String]) -> bool {
    let lower = name.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&lower.as_str())
        || TRACKING_PREFIXES.iter().any(|p| lower.starts_with(p))
        || extra.iter().any(|e| e.eq_ignore_ascii_case(&lower))
}

/// Normalize a product URL into its canonical link.
///
/// Keeps scheme, host and path; drops the fragment, a trailing path slash and
/// every tracking parameter. Surviving query parameters are sorted by key so
/// parameter order never produces distinct links.
#[must_use]
pub fn canonical_link(url: &Url, extra_tracking: &[String]) -> String {
    let mut canonical = url.clone();
    canonical.set_fragment(None);

    let path = canonical.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        canonical.set_path(&path[..path.len() - 1]);
    }

    let mut kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k, extra_tracking))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    kept.sort();

    if kept.is_empty() {
        canonical.set_query(None);
    } else {
        canonical.query_pairs_mut().clear().extend_pairs(kept.iter());
    }

    canonical.to_string()
}

/// Canonicalize a link given as a string. Relative links resolve against
/// `base`; unparseable links come back trimmed but otherwise untouched.
#[must_use]
pub fn canonicalize(link: &str, base: Option<&Url>, extra_tracking: &[String]) -> String {
    match resolve_url(link, base) {
        Some(url) => canonical_link(&url, extra_tracking),
        None => link.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.walmart.com/search?q=wallet").unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_is_absolute_url_valid() {
        let (is_abs, url) = is_absolute_url("https://example.com/path");
        assert!(is_abs);
        assert!(url.is_some());
    }

    #[test]
    fn test_is_absolute_url_invalid() {
        assert!(!is_absolute_url("/relative/path").0);
        assert!(!is_absolute_url("example.com").0);
        assert!(!is_absolute_url("").0);
        assert!(!is_absolute_url("ftp://example.com").0);
    }

    #[test]
    fn test_resolve_relative_and_protocol_relative() {
        let base = base();
        assert_eq!(
            resolve_url("/ip/123", Some(&base)).map(|u| u.to_string()),
            Some("https://www.walmart.com/ip/123".to_string())
        );
        assert_eq!(
            resolve_url("//i5.walmartimages.com/a.jpg", Some(&base)).map(|u| u.to_string()),
            Some("https://i5.walmartimages.com/a.jpg".to_string())
        );
    }

    #[test]
    fn test_resolve_rejects_special_schemes_and_missing_base() {
        let base = base();
        assert!(resolve_url("data:image/gif;base64,R0lGOD", Some(&base)).is_none());
        assert!(resolve_url("javascript:void(0)", Some(&base)).is_none());
        assert!(resolve_url("/ip/1", None).is_none());
        assert!(resolve_url("   ", Some(&base)).is_none());
    }

    #[test]
    fn test_canonical_link_strips_tracking() {
        let url = Url::parse(
            "https://www.walmart.com/ip/Leather-Wallet/123/?classType=REGULAR&athbdg=L1600&utm_source=x#reviews",
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(canonical_link(&url, &[]), "https://www.walmart.com/ip/Leather-Wallet/123");
    }

    #[test]
    fn test_canonical_link_keeps_and_sorts_real_params() {
        let url = Url::parse("https://shop.example.com/p?variant=blue&size=m&gclid=abc")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            canonical_link(&url, &[]),
            "https://shop.example.com/p?size=m&variant=blue"
        );
    }

    #[test]
    fn test_extra_tracking_params() {
        let url = Url::parse("https://shop.example.com/p?sessionToken=1&id=7")
            .unwrap_or_else(|e| panic!("{e}"));
        let extra = vec!["sessiontoken".to_string()];
        assert_eq!(canonical_link(&url, &extra), "https://shop.example.com/p?id=7");
    }

    #[test]
    fn test_ath_params_only_by_name() {
        assert!(is_tracking_param("athcpid", &[]));
        assert!(is_tracking_param("AthBdg", &[]));
        assert!(!is_tracking_param("athlete", &[]));
        let url = Url::parse("https://shop.example.com/p?athlete=pro&athznid=x")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(canonical_link(&url, &[]), "https://shop.example.com/p?athlete=pro");
    }

    #[test]
    fn test_canonicalize_host_case_insensitive() {
        let a = canonicalize("https://WWW.Walmart.com/ip/1?athcpid=9", None, &[]);
        let b = canonicalize("/ip/1", Some(&base()), &[]);
        assert_eq!(a, b);
    }
}
