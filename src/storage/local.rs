//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {full_index_file}     # Full index
//! └── {smart_index_file}    # Smart index
//! ```
//!
//! Writes go to a temporary sibling first and are renamed over the target.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{OutputConfig, ReleaseCollection};
use crate::storage::{IndexSlot, IndexStorage};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    full_index_file: String,
    smart_index_file: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(
        root_dir: impl Into<PathBuf>,
        full_index_file: impl Into<String>,
        smart_index_file: impl Into<String>,
    ) -> Self {
        Self {
            root_dir: root_dir.into(),
            full_index_file: full_index_file.into(),
            smart_index_file: smart_index_file.into(),
        }
    }

    /// Create a LocalStorage from the output configuration.
    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(
            &output.dir,
            &output.full_index_file,
            &output.smart_index_file,
        )
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path of a slot.
    pub fn slot_path(&self, slot: IndexSlot) -> PathBuf {
        match slot {
            IndexSlot::Full => self.root_dir.join(&self.full_index_file),
            IndexSlot::Smart => self.root_dir.join(&self.smart_index_file),
        }
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        Self::ensure_dir(path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await
    }
}

#[async_trait]
impl IndexStorage for LocalStorage {
    async fn read_index(&self, slot: IndexSlot) -> Result<ReleaseCollection> {
        let path = self.slot_path(slot);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::read(slot, format!("{}: {}", path.display(), e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::read(slot, format!("{}: {}", path.display(), e)))
    }

    async fn save_index(&self, slot: IndexSlot, releases: &ReleaseCollection) -> Result<()> {
        let path = self.slot_path(slot);

        let mut bytes = serde_json::to_vec_pretty(releases)?;
        bytes.push(b'\n');

        Self::write_bytes(&path, &bytes)
            .await
            .map_err(|e| AppError::persist(slot, format!("{}: {}", path.display(), e)))?;

        log::info!(
            "Saved {} releases to {} ({} index)",
            releases.len(),
            path.display(),
            slot
        );
        Ok(())
    }
}
