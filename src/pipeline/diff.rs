//! Diff between two full index snapshots.
//!
//! Reports which versions appeared or disappeared upstream since the last
//! refresh.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::ReleaseCollection;

/// Versions added and removed between two listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDiff {
    /// Versions present now but not before, newest first
    pub added: Vec<String>,
    /// Versions present before but not now, in previous order
    pub removed: Vec<String>,
}

impl ReleaseDiff {
    /// Calculate the diff between previous and current listings.
    pub fn calculate(previous: &ReleaseCollection, current: &ReleaseCollection) -> Self {
        let prev_versions: HashSet<&str> = previous.iter().map(|r| r.version.as_str()).collect();
        let curr_versions: HashSet<&str> = current.iter().map(|r| r.version.as_str()).collect();

        let added = current
            .iter()
            .filter(|r| !prev_versions.contains(r.version.as_str()))
            .map(|r| r.version.clone())
            .collect();

        let removed = previous
            .iter()
            .filter(|r| !curr_versions.contains(r.version.as_str()))
            .map(|r| r.version.clone())
            .collect();

        Self { added, removed }
    }

    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}
