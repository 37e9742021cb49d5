//! Strategy Chains
//!
//! Ordered strategy tables for each field: `card` for search-result tiles
//! (and embedded search items), `detail` for product detail pages. A field's
//! chain is tried top to bottom; the first strategy that yields a valid value
//! wins.

pub mod card;
pub mod detail;

use crate::extractor::{Field, Strategy};

/// Chain for a field on a search-result candidate.
#[must_use]
pub fn card_chain(field: Field) -> &'static [Strategy] {
    match field {
        Field::Name => card::NAME,
        Field::Price => card::PRICE,
        Field::Image => card::IMAGE,
        Field::Link => card::LINK,
        Field::Images => card::IMAGES,
        Field::Shipping => card::SHIPPING,
        Field::Description => card::DESCRIPTION,
    }
}

/// Chain for a field on a product detail page.
#[must_use]
pub fn detail_chain(field: Field) -> &'static [Strategy] {
    match field {
        Field::Name => detail::NAME,
        Field::Price => detail::PRICE,
        Field::Image => detail::IMAGE,
        Field::Link => detail::LINK,
        Field::Images => detail::IMAGES,
        Field::Shipping => detail::SHIPPING,
        Field::Description => detail::DESCRIPTION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Tier;

    #[test]
    fn test_chains_are_tier_ordered() {
        for field in Field::ALL {
            let chain = card_chain(field);
            assert!(!chain.is_empty(), "{field} has no card chain");
            assert!(chain.windows(2).all(|w| w[0].tier <= w[1].tier), "{field} card chain out of order");
            assert!(chain.iter().all(|s| s.tier != Tier::DetailPage));
        }
    }

    #[test]
    fn test_detail_chains_are_detail_tier() {
        for field in Field::ALL {
            let chain = detail_chain(field);
            assert!(!chain.is_empty(), "{field} has no detail chain");
            assert!(chain.iter().all(|s| s.tier == Tier::DetailPage));
        }
    }
}
