//! Smart index filter.
//!
//! Keeps the newest `keep_recent` releases verbatim, then at most one
//! release per major line that the window did not already cover. Input
//! must be ordered newest first; the retained legacy release is the first
//! one met in traversal order.

use std::collections::HashSet;

use crate::models::{Release, ReleaseCollection};

/// Size of the recency window when none is configured.
pub const DEFAULT_KEEP_RECENT: usize = 10;

/// Reduces a full release listing to the smart index.
#[derive(Debug, Clone, Copy)]
pub struct SmartFilter {
    keep_recent: usize,
}

impl SmartFilter {
    /// Create a filter with the default recency window.
    pub fn new() -> Self {
        Self::with_keep_recent(DEFAULT_KEEP_RECENT)
    }

    /// Create a filter with a custom recency window.
    pub fn with_keep_recent(keep_recent: usize) -> Self {
        Self { keep_recent }
    }

    /// Build the smart index from a newest-first listing.
    pub fn apply(&self, all: &ReleaseCollection) -> ReleaseCollection {
        if all.is_empty() {
            return all.clone();
        }

        let releases = all.releases();
        let limit = self.keep_recent.min(releases.len());
        let (recent, legacy) = releases.split_at(limit);

        let mut seen_majors: HashSet<&str> = HashSet::new();
        let mut filtered: Vec<Release> = Vec::with_capacity(limit);

        for release in recent {
            if !release.major.is_empty() {
                seen_majors.insert(&release.major);
            }
            filtered.push(release.clone());
        }

        for release in legacy {
            if release.is_classified() && seen_majors.insert(&release.major) {
                filtered.push(release.clone());
            }
        }

        log::info!(
            "Smart index generated: reduced from {} to {} entries",
            releases.len(),
            filtered.len()
        );

        ReleaseCollection::new(filtered)
    }
}

impl Default for SmartFilter {
    fn default() -> Self {
        Self::new()
    }
}
