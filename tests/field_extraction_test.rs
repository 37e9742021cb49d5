//! Card-level extraction through the public `extract_candidate` entry point.

use rs_product_harvest::{
    extract_candidate, AttemptOutcome, Assembly, Candidate, Field, FieldValue, Options, RawPayload, Rejection, Tier,
};
use rust_decimal::Decimal;

const PAGE_URL: &str = "https://www.walmart.com/search?q=wallet&page=1";

fn complete(payload: RawPayload) -> Candidate {
    match extract_candidate(payload, &Options::default()) {
        Assembly::Complete(candidate) => candidate,
        Assembly::Rejected(_, reason) => panic!("unexpected rejection: {reason}"),
    }
}

fn text(candidate: &Candidate, field: Field) -> Option<&str> {
    candidate.value(field).and_then(FieldValue::as_text)
}

#[test]
fn embedded_item_uses_fallback_paths() {
    let item = serde_json::json!({
        "__typename": "Product",
        "name": "  Genuine   Leather Bifold ",
        "canonicalUrl": "/ip/Genuine-Leather-Bifold/123?athbdg=L1600",
        "imageInfo": {
            "thumbnailUrl": "https://i5.walmartimages.com/seo/123.jpeg",
            "allImages": [
                {"url": "https://i5.walmartimages.com/seo/123.jpeg"},
                {"url": "https://i5.walmartimages.com/seo/123_b.jpeg"},
                {"url": "https://i5.walmartimages.com/seo/123.jpeg"}
            ]
        },
        "priceInfo": {"currentPrice": {"priceString": "$1,299.00"}},
        "fulfillmentBadge": "Free shipping, arrives in 3+ days"
    });
    let candidate = complete(RawPayload::json(item.to_string()).with_page_url(PAGE_URL));

    assert_eq!(text(&candidate, Field::Name), Some("Genuine Leather Bifold"));
    assert_eq!(candidate.price(), Some(Decimal::from(1299)));
    assert_eq!(
        candidate.link(),
        Some("https://www.walmart.com/ip/Genuine-Leather-Bifold/123?athbdg=L1600")
    );
    assert_eq!(
        candidate.value(Field::Images).and_then(FieldValue::as_urls).map(<[String]>::len),
        Some(2)
    );
    assert_eq!(text(&candidate, Field::Shipping), Some("Free shipping, arrives in 3+ days"));
    assert_eq!(candidate.missing_optional(), vec![Field::Description]);

    for field in Field::REQUIRED {
        assert_eq!(candidate.provenance(field), Some(Tier::StructuredData), "{field}");
    }
}

#[test]
fn card_markup_prefers_embedded_ld_json() {
    let html = r#"<div data-item-id="42">
        <script type="application/ld+json">
            {"@context": "https://schema.org", "@type": "Product", "name": "Travel Wallet",
             "image": "https://i5.walmartimages.com/seo/42.jpeg",
             "offers": {"@type": "Offer", "price": "31.50", "priceCurrency": "USD"}}
        </script>
        <a href="/ip/Travel-Wallet/42"><span data-automation-id="product-title">Travel Wallet (2 Pack)</span></a>
        <img data-testid="productTileImage" src="https://i5.walmartimages.com/seo/42-tile.jpeg">
    </div>"#;
    let candidate = complete(RawPayload::html(html).with_page_url(PAGE_URL));

    assert_eq!(text(&candidate, Field::Name), Some("Travel Wallet"));
    assert_eq!(candidate.provenance(Field::Name), Some(Tier::StructuredData));
    assert_eq!(candidate.price(), Some(Decimal::new(315, 1)));
    assert_eq!(candidate.provenance(Field::Link), Some(Tier::Selector));
    assert_eq!(candidate.link(), Some("https://www.walmart.com/ip/Travel-Wallet/42"));
}

#[test]
fn name_falls_back_to_older_tile_markup() {
    let html = r#"<div data-item-id="5">
        <a href="/ip/Money-Clip/5"><span class="w_iUH7">Money Clip</span></a>
        <img src="https://i5.walmartimages.com/seo/5.jpeg">
        <div data-automation-id="product-price"><div>$7.44</div></div>
    </div>"#;
    let candidate = complete(RawPayload::html(html).with_page_url(PAGE_URL));

    assert_eq!(text(&candidate, Field::Name), Some("Money Clip"));
    assert_eq!(candidate.provenance(Field::Name), Some(Tier::Selector));

    let tries: Vec<(u32, bool)> = candidate
        .attempts_for(Field::Name)
        .map(|a| (a.index, a.outcome.is_success()))
        .collect();
    assert_eq!(tries, vec![(1, false), (2, false), (3, true)]);

    // The generic `img` selector is the last image strategy.
    let image_tries = candidate.attempts_for(Field::Image).count();
    assert_eq!(image_tries, 3);
}

#[test]
fn non_numeric_price_is_a_missing_field() {
    let html = r#"<div data-item-id="8">
        <a href="/ip/Chain-Wallet/8"><span data-automation-id="product-title">Chain Wallet</span></a>
        <img data-testid="productTileImage" src="https://i5.walmartimages.com/seo/8.jpeg">
        <div data-automation-id="product-price"><div>See price in cart</div></div>
    </div>"#;

    let Assembly::Rejected(candidate, reason) =
        extract_candidate(RawPayload::html(html).with_page_url(PAGE_URL), &Options::default())
    else {
        panic!("expected rejection");
    };

    assert_eq!(
        reason,
        Rejection::RequiredFieldMissing {
            fields: vec![Field::Price]
        }
    );
    assert!(candidate.value(Field::Price).is_none());
    assert!(candidate
        .attempts_for(Field::Price)
        .all(|a| matches!(a.outcome, AttemptOutcome::Failure { .. })));
}

#[test]
fn unreadable_item_misses_every_required_field() {
    let Assembly::Rejected(candidate, reason) =
        extract_candidate(RawPayload::json("{\"name\": \"Wallet\""), &Options::default())
    else {
        panic!("expected rejection");
    };

    assert_eq!(reason.missing_fields(), &Field::REQUIRED);
    assert_eq!(reason.code(), "required-field-missing");
    let first = candidate
        .attempts_for(Field::Name)
        .next()
        .unwrap_or_else(|| panic!("no name attempt"));
    assert!(matches!(
        &first.outcome,
        AttemptOutcome::Failure { reason } if reason.contains("not valid JSON")
    ));
}
