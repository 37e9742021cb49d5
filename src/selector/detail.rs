//! Product detail page chains.
//!
//! Used only by the single enrichment pass. Every strategy carries the
//! detail-page tier.

use crate::extractor::Strategy;

/// Gallery containers, hero image first.
const GALLERY: &[&str] = &[
    "img.prod-hero-image",
    "img[itemprop='image']",
    "ul.slider-list img",
    "div.carousel img",
    "div.thumbnail-list img",
    "div.product-image-gallery img",
];

pub static NAME: &[Strategy] = &[
    Strategy::structured(&[], &["name"]).on_detail_page(),
    Strategy::text("h1.prod-ProductTitle").on_detail_page(),
    Strategy::text(r#"h1[itemprop="name"]"#).on_detail_page(),
    Strategy::text("h1").on_detail_page(),
];

pub static PRICE: &[Strategy] = &[
    Strategy::structured(&[], &["offers", "price"]).on_detail_page(),
    Strategy::attr("span.price-characteristic", "content").on_detail_page(),
    Strategy::attr(r#"meta[itemprop="price"]"#, "content").on_detail_page(),
    Strategy::text("span.price").on_detail_page(),
];

pub static IMAGE: &[Strategy] = &[
    Strategy::structured(&[], &["image"]).on_detail_page(),
    Strategy::attr("img.prod-hero-image", "src").on_detail_page(),
    Strategy::attr("img[itemprop='image']", "src").on_detail_page(),
    Strategy::attr(r#"meta[property="og:image"]"#, "content").on_detail_page(),
];

pub static LINK: &[Strategy] = &[
    Strategy::structured(&[], &["url"]).on_detail_page(),
    Strategy::attr(r#"link[rel="canonical"]"#, "href").on_detail_page(),
    Strategy::attr(r#"meta[property="og:url"]"#, "content").on_detail_page(),
];

pub static IMAGES: &[Strategy] = &[
    Strategy::attr_list(GALLERY, &["src", "srcset"]).on_detail_page(),
    Strategy::structured_list(&[], &["image"]).on_detail_page(),
];

pub static SHIPPING: &[Strategy] = &[
    Strategy::text(r#"[data-testid="fulfillment-summary"]"#).on_detail_page(),
    Strategy::text_containing("span", "shipping").on_detail_page(),
    Strategy::text(r#"div[data-automation-id="fulfillment-badge"]"#).on_detail_page(),
];

pub static DESCRIPTION: &[Strategy] = &[
    Strategy::structured(&[], &["description"]).on_detail_page(),
    Strategy::text("#product-description p").on_detail_page(),
    Strategy::text(r#"[data-testid="product-description"]"#).on_detail_page(),
    Strategy::attr(r#"meta[name="description"]"#, "content").on_detail_page(),
];
