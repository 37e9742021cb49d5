//! Capabilities the collector consumes.
//!
//! Fetching search pages, fetching detail pages and persisting raw payloads
//! all happen outside the core. They are injected as async traits so a run
//! can be driven by a browser pool, a subprocess crawler or saved fixtures.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::candidate::{Candidate, CandidateRef, RawPayload};
use crate::collector::context::{RunContext, RunId};
use crate::extractor::Field;

/// Failure of a fetch capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("fetch timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("fetch process crashed (exit status {}): {stderr}", status.map_or_else(|| "none".to_string(), |s| s.to_string()))]
    Crash { status: Option<i32>, stderr: String },

    #[error("fetch output could not be parsed: {0}")]
    Malformed(String),

    #[error("blocked by anti-bot interstitial (marker: {marker})")]
    Blocked { marker: String },
}

/// Diagnostic category of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCategory {
    SubprocessFailure,
    OutputParseFailure,
    Blocked,
}

impl FailureCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureCategory::SubprocessFailure => "subprocess-failure",
            FailureCategory::OutputParseFailure => "output-parse-failure",
            FailureCategory::Blocked => "blocked",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FetchError {
    #[must_use]
    pub const fn category(&self) -> FailureCategory {
        match self {
            FetchError::Timeout { .. } | FetchError::Crash { .. } => FailureCategory::SubprocessFailure,
            FetchError::Malformed(_) => FailureCategory::OutputParseFailure,
            FetchError::Blocked { .. } => FailureCategory::Blocked,
        }
    }
}

/// Raw persistence failure. Never fails a run.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("raw store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("raw record serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fetches one page of search results as raw candidate payloads, in page
/// order.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, ctx: &RunContext, page: u32) -> Result<Vec<RawPayload>, FetchError>;
}

/// Fetches a candidate's product detail page.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_detail(&self, candidate: &Candidate) -> Result<RawPayload, FetchError>;
}

/// What gets persisted for a rejected or incomplete candidate.
#[derive(Debug, Clone, Serialize)]
pub struct RawRecord {
    pub run_id: RunId,
    pub at: DateTime<Utc>,
    pub candidate: CandidateRef,
    /// Rejection reason code.
    pub reason: String,
    pub message: String,
    pub missing: Vec<Field>,
    pub link: Option<String>,
    pub raw: RawPayload,
    pub detail_raw: Option<RawPayload>,
}

/// Forensic storage of raw payloads. Best effort.
#[async_trait]
pub trait RawStore: Send + Sync {
    async fn persist(&self, record: &RawRecord) -> Result<(), StoreError>;
}

/// Discards raw records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRawStore;

#[async_trait]
impl RawStore for NullRawStore {
    async fn persist(&self, _record: &RawRecord) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Appends raw records to a JSON-lines file.
#[derive(Debug)]
pub struct JsonlRawStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlRawStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RawStore for JsonlRawStore {
    async fn persist(&self, record: &RawRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
