//! Canonical links as the deduplicator sees them.

use rs_product_harvest::dedup::Deduplicator;
use rs_product_harvest::url_utils::{canonicalize, is_tracking_param};
use rs_product_harvest::Rejection;
use url::Url;

fn base() -> Url {
    Url::parse("https://www.walmart.com/search?q=wallet").unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn search_tracking_variants_share_one_canonical_link() {
    let variants = [
        "https://www.walmart.com/ip/Bifold-Wallet/123",
        "https://www.walmart.com/ip/Bifold-Wallet/123/",
        "https://www.walmart.com/ip/Bifold-Wallet/123?classType=REGULAR&athbdg=L1600",
        "https://www.walmart.com/ip/Bifold-Wallet/123?from=/search&sid=abc#about",
        "/ip/Bifold-Wallet/123?utm_source=email&utm_medium=x",
    ];
    for link in variants {
        assert_eq!(
            canonicalize(link, Some(&base()), &[]),
            "https://www.walmart.com/ip/Bifold-Wallet/123",
            "{link}"
        );
    }
}

#[test]
fn variant_selection_survives_normalization() {
    let blue = canonicalize("https://shop.example.com/p/9?color=blue&size=l&gclid=z", None, &[]);
    let red = canonicalize("https://shop.example.com/p/9?size=l&color=red", None, &[]);
    assert_eq!(blue, "https://shop.example.com/p/9?color=blue&size=l");
    assert_ne!(blue, red);
}

#[test]
fn configured_tracking_params_are_dropped() {
    let extra = vec!["storeId".to_string()];
    assert!(is_tracking_param("STOREID", &extra));
    assert_eq!(
        canonicalize("https://www.walmart.com/ip/9?storeId=5", None, &extra),
        "https://www.walmart.com/ip/9"
    );
}

#[test]
fn deduplicator_only_remembers_admitted_links() {
    let mut dedup = Deduplicator::new(Vec::new());
    let first = "https://www.walmart.com/ip/Card-Case/77?athcpid=1";

    // A rejected candidate is checked but never admitted.
    assert!(dedup.check(first).is_ok());
    assert!(dedup.check(first).is_ok());
    assert!(dedup.is_empty());

    assert!(dedup.admit(first));
    let again = dedup.check("https://www.walmart.com/ip/Card-Case/77#reviews");
    assert!(matches!(
        again,
        Err(Rejection::DuplicateLink { ref first_seen, ref canonical, .. })
            if first_seen == first && canonical == "https://www.walmart.com/ip/Card-Case/77"
    ));
    assert!(!dedup.admit("https://www.walmart.com/ip/Card-Case/77"));
    assert_eq!(dedup.len(), 1);
}
