//! Storage abstractions for index persistence.
//!
//! Two independent slots, each a flat JSON array of releases:
//!
//! ```text
//! public/api/
//! ├── full_index.json       # Every release, newest first
//! └── smart_index.json      # Recency window + one release per legacy line
//! ```

pub mod local;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ReleaseCollection;

// Re-export for convenience
pub use local::LocalStorage;

/// Named index slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexSlot {
    /// Complete release listing
    Full,
    /// Size-reduced listing
    Smart,
}

impl fmt::Display for IndexSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSlot::Full => f.write_str("full"),
            IndexSlot::Smart => f.write_str("smart"),
        }
    }
}

/// Trait for index storage backends.
#[async_trait]
pub trait IndexStorage: Send + Sync {
    /// Read the releases stored in a slot.
    ///
    /// Fails when the slot is absent or its content is malformed.
    async fn read_index(&self, slot: IndexSlot) -> Result<ReleaseCollection>;

    /// Overwrite a slot with the given releases.
    async fn save_index(&self, slot: IndexSlot, releases: &ReleaseCollection) -> Result<()>;
}
