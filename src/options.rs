//! Configuration options for collection runs.
//!
//! `Options` holds the settings that stay the same from one run to the next
//! (site base URL, enrichment scope, retries, persistence). Per-call ceilings
//! live in `HardStops`, passed with each request.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// When a candidate may spend its single detail-page fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrichmentPolicy {
    /// Never fetch detail pages.
    Disabled,
    /// Only when link and image resolved but price did not.
    #[default]
    PriceOnly,
    /// Whenever the link resolved and any required field is missing.
    AnyRequiredMissing,
}

/// Configuration options for collection.
///
/// All fields are public. Use `Default::default()` for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_product_harvest::{EnrichmentPolicy, Options};
///
/// let options = Options {
///     enrichment: EnrichmentPolicy::AnyRequiredMissing,
///     retries_per_page: 1,
///     ..Options::default()
/// };
/// assert!(options.persist_rejected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Site root. Relative links and images resolve against it when a
    /// payload does not carry its own page URL.
    ///
    /// Default: `https://www.walmart.com`
    pub base_url: String,

    /// Detail-page enrichment scope.
    ///
    /// Default: `EnrichmentPolicy::PriceOnly`
    pub enrichment: EnrichmentPolicy,

    /// Extra requests for a page index whose fetch failed, before the page
    /// is treated as empty. Each retry counts as an attempt.
    ///
    /// Default: `0`
    pub retries_per_page: u32,

    /// Hand rejected candidates' raw payloads to the raw store.
    ///
    /// Default: `true`
    pub persist_rejected: bool,

    /// Query parameters stripped from links in addition to the built-in
    /// tracking list.
    ///
    /// Default: empty
    pub extra_tracking_params: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: "https://www.walmart.com".to_string(),
            enrichment: EnrichmentPolicy::PriceOnly,
            retries_per_page: 0,
            persist_rejected: true,
            extra_tracking_params: Vec::new(),
        }
    }
}

impl Options {
    /// Parse options from JSON. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Options(e.to_string()))
    }
}

/// Caller ceilings bounding a run's cost. Checked before every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardStops {
    /// Maximum page indices visited.
    ///
    /// Default: `8`
    pub max_pages: u32,

    /// Maximum fetch requests, retries included.
    ///
    /// Default: `16`
    pub max_attempts: u32,
}

impl Default for HardStops {
    fn default() -> Self {
        Self {
            max_pages: 8,
            max_attempts: 16,
        }
    }
}

impl HardStops {
    #[must_use]
    pub const fn new(max_pages: u32, max_attempts: u32) -> Self {
        Self {
            max_pages,
            max_attempts,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::invalid("max_pages must be at least 1"));
        }
        if self.max_attempts == 0 {
            return Err(Error::invalid("max_attempts must be at least 1"));
        }
        Ok(())
    }
}
