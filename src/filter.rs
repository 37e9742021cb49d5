//! Price bounds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rejection::Rejection;

/// Inclusive price bounds. An unset side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceBounds {
    #[must_use]
    pub const fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self { min: None, max: None }
    }

    /// Bounds must be non-negative and `min <= max` when both are set.
    pub fn validate(&self) -> Result<()> {
        for (side, value) in [("min", self.min), ("max", self.max)] {
            if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
                return Err(Error::invalid(format!("{side} price must not be negative")));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(Error::invalid(format!(
                    "min price {min} is greater than max price {max}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// Rejects prices outside a run's bounds.
#[derive(Debug, Clone, Copy)]
pub struct PriceFilter {
    bounds: PriceBounds,
}

impl PriceFilter {
    #[must_use]
    pub const fn new(bounds: PriceBounds) -> Self {
        Self { bounds }
    }

    pub fn check(&self, price: Decimal) -> std::result::Result<(), Rejection> {
        if self.bounds.contains(price) {
            Ok(())
        } else {
            Err(Rejection::PriceOutOfBounds {
                price,
                min: self.bounds.min,
                max: self.bounds.max,
            })
        }
    }
}
