//! Performance benchmarks for rs-product-harvest.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Card assembly from an embedded JSON item and from tile markup
//! - Splitting a full search page into candidates

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rs_product_harvest::search_page::split_candidates;
use rs_product_harvest::{extract_candidate, Options, RawPayload};

const JSON_ITEM: &str = r#"{
    "__typename": "Product",
    "usItemId": "123",
    "name": "Genuine Leather Bifold Wallet",
    "canonicalUrl": "/ip/Genuine-Leather-Bifold-Wallet/123?classType=REGULAR&athbdg=L1600",
    "image": "https://i5.walmartimages.com/seo/wallet_123.jpeg",
    "imageInfo": {"allImages": [{"url": "https://i5.walmartimages.com/seo/wallet_123.jpeg"}, {"url": "https://i5.walmartimages.com/seo/wallet_123_b.jpeg"}]},
    "priceInfo": {"currentPrice": {"price": 24.97, "priceString": "$24.97"}},
    "fulfillmentBadge": "Free shipping, arrives in 2 days",
    "shortDescription": "RFID blocking, 8 card slots."
}"#;

const CARD_HTML: &str = r#"<div data-item-id="456" class="mb0 ph1 pa0-xl bb b--near-white w-25">
    <a link-identifier="456" href="/ip/Slim-Card-Holder/456?athcpid=abc"><span class="w_iUH7">Slim Card Holder</span></a>
    <img data-testid="productTileImage" src="https://i5.walmartimages.com/seo/holder_456.jpeg?odnHeight=180">
    <div data-automation-id="product-price"><div class="mr1 mr2-xl b black lh-copy f5 f4-l">current price $12.88</div></div>
    <div class="flex flex-wrap"><span data-automation-id="fulfillment-badge">Free shipping, arrives tomorrow</span></div>
</div>"#;

fn search_page(cards: usize) -> String {
    let mut html = String::from("<html><body><main>");
    for _ in 0..cards {
        html.push_str(CARD_HTML);
    }
    html.push_str("</main></body></html>");
    html
}

fn bench_assemble_json_item(c: &mut Criterion) {
    let options = Options::default();
    c.bench_function("assemble_json_item", |b| {
        b.iter(|| extract_candidate(black_box(RawPayload::json(JSON_ITEM)), &options));
    });
}

fn bench_assemble_card_html(c: &mut Criterion) {
    let options = Options::default();
    c.bench_function("assemble_card_html", |b| {
        b.iter(|| extract_candidate(black_box(RawPayload::html(CARD_HTML)), &options));
    });
}

fn bench_split_page(c: &mut Criterion) {
    let html = search_page(40);
    let mut group = c.benchmark_group("split_page");
    group.throughput(Throughput::Bytes(html.len() as u64));
    group.bench_function("dom_cards_40", |b| {
        b.iter(|| split_candidates(black_box(&html), Some("https://www.walmart.com/search?q=wallet")));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_assemble_json_item,
    bench_assemble_card_html,
    bench_split_page
);
criterion_main!(benches);
