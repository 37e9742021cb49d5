//! Error types for rs-product-harvest.
//!
//! `Error` is what the public collection entry point can fail with. Everything
//! that goes wrong *inside* a run (a blocked page, a missing field, a
//! duplicate) is recovered locally and reported through diagnostics instead,
//! so it never shows up here.

/// Error type for collection requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request parameters are inconsistent; no fetch was attempted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Options could not be loaded (binary / config file only).
    #[error("Invalid options: {0}")]
    Options(String),
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }
}

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, Error>;
