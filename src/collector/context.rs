//! Per-run identity and counters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::PriceBounds;

/// Opaque run identifier, unique per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// State of one collection run.
///
/// Counters only move forward and only the controller moves them; fetchers
/// get a shared reference to read the term, bounds and page position.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: RunId,
    term: String,
    requested: usize,
    bounds: PriceBounds,
    attempts: u32,
    pages: u32,
    started_at: DateTime<Utc>,
}

impl RunContext {
    #[must_use]
    pub fn new(term: impl Into<String>, requested: usize, bounds: PriceBounds) -> Self {
        Self {
            run_id: RunId::new(),
            term: term.into(),
            requested,
            bounds,
            attempts: 0,
            pages: 0,
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub const fn requested(&self) -> usize {
        self.requested
    }

    #[must_use]
    pub const fn bounds(&self) -> PriceBounds {
        self.bounds
    }

    /// Fetch requests issued so far, retries included.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Page indices visited so far. The page being fetched is `pages()`.
    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.pages
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Milliseconds since the run started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }

    pub(crate) fn next_page(&mut self) -> u32 {
        self.pages += 1;
        self.pages
    }

    pub(crate) fn record_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }
}
