//! Duplicate suppression on canonical links.

use std::collections::HashMap;

use crate::rejection::Rejection;
use crate::url_utils;

/// Canonical links accepted so far in one run.
///
/// `check` never mutates the set; only `admit` does, and the controller calls
/// it once a candidate has passed every other check.
#[derive(Debug, Default)]
pub struct Deduplicator {
    /// canonical link -> link as first accepted
    seen: HashMap<String, String>,
    extra_tracking: Vec<String>,
}

impl Deduplicator {
    #[must_use]
    pub fn new(extra_tracking: Vec<String>) -> Self {
        Self {
            seen: HashMap::new(),
            extra_tracking,
        }
    }

    #[must_use]
    pub fn canonical(&self, link: &str) -> String {
        url_utils::canonicalize(link, None, &self.extra_tracking)
    }

    pub fn check(&self, link: &str) -> Result<String, Rejection> {
        let canonical = self.canonical(link);
        match self.seen.get(&canonical) {
            Some(first_seen) => Err(Rejection::DuplicateLink {
                link: link.to_string(),
                canonical,
                first_seen: first_seen.clone(),
            }),
            None => Ok(canonical),
        }
    }

    /// Record an accepted link. Returns `false` if it was already present.
    pub fn admit(&mut self, link: &str) -> bool {
        let canonical = self.canonical(link);
        if self.seen.contains_key(&canonical) {
            return false;
        }
        self.seen.insert(canonical, link.to_string());
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
