//! Search-result card chains.
//!
//! The structured tier reads embedded search items (`__NEXT_DATA__`), or
//! JSON-LD when a card is markup. Selector fallbacks follow the tile markup,
//! newest class names first.

use crate::extractor::Strategy;

pub static NAME: &[Strategy] = &[
    Strategy::structured(&[&["name"]], &["name"]),
    Strategy::text(r#"span[data-automation-id="product-title"]"#),
    Strategy::text("a span.w_iUH7"),
    Strategy::text(".f6.f5-l"),
];

pub static PRICE: &[Strategy] = &[
    Strategy::structured(
        &[
            &["priceInfo", "currentPrice", "price"],
            &["priceInfo", "currentPrice", "priceString"],
            &["price"],
        ],
        &["offers", "price"],
    ),
    Strategy::text(r#"div[data-automation-id="product-price"] div"#),
    Strategy::text(".aa88"),
    Strategy::attr("span.price-characteristic", "content"),
];

pub static IMAGE: &[Strategy] = &[
    Strategy::structured(&[&["image"], &["imageInfo", "thumbnailUrl"]], &["image"]),
    Strategy::attr(r#"img[data-testid="productTileImage"]"#, "src"),
    Strategy::attr("img", "src"),
];

pub static LINK: &[Strategy] = &[
    Strategy::structured(&[&["canonicalUrl"]], &["url"]),
    Strategy::attr("a", "href"),
];

pub static IMAGES: &[Strategy] = &[Strategy::structured_list(&[&["imageInfo", "allImages"]], &["image"])];

// Embedded items carry shipping as a label or a list of badge objects.
pub static SHIPPING: &[Strategy] = &[
    Strategy::structured(&[&["fulfillmentLabel"], &["fulfillmentBadge"]], &[]),
    Strategy::text(r#"span[data-automation-id="fulfillment-badge"]"#),
    Strategy::text(r#"div[data-testid="shippingMessage"]"#),
    Strategy::text_containing("span", "shipping"),
];

pub static DESCRIPTION: &[Strategy] = &[Strategy::structured(
    &[&["shortDescription"], &["description"]],
    &["description"],
)];
