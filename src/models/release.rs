//! Release record and release collection.

use serde::{Deserialize, Serialize};

/// Major-line tag for releases that cannot be classified.
pub const UNCLASSIFIED_MAJOR: &str = "Outros";

/// Tag prefix of the current naming scheme (`GE-Proton10-29`).
const GE_PROTON_PREFIX: &str = "GE-Proton";

/// A single published release with its distributable archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    /// Version tag (e.g. "GE-Proton10-29")
    pub version: String,

    /// Download URL of the `.tar.gz` archive
    #[serde(rename = "url")]
    pub download_url: String,

    /// Archive size in bytes
    pub size: u64,

    /// Publication date (YYYY-MM-DD)
    pub date: String,

    /// Major-line tag derived from the version (e.g. "Proton10")
    pub major: String,
}

impl Release {
    /// Whether this release belongs to a known major line.
    pub fn is_classified(&self) -> bool {
        !self.major.is_empty() && self.major != UNCLASSIFIED_MAJOR
    }
}

/// Derive the major-line tag from a version tag.
///
/// - `GE-Proton10-29` → `Proton10`
/// - `7.3-GE-1` → `Proton7`
/// - anything else → `Outros`
pub fn major_line(tag: &str) -> String {
    if tag.starts_with(GE_PROTON_PREFIX) {
        return match tag.split('-').nth(1) {
            Some(segment) => segment.to_string(),
            None => UNCLASSIFIED_MAJOR.to_string(),
        };
    }

    if tag.starts_with(|c: char| c.is_ascii_digit()) {
        let leading = tag.split('.').next().unwrap_or_default();
        return format!("Proton{leading}");
    }

    UNCLASSIFIED_MAJOR.to_string()
}

/// Ordered release list, newest first.
///
/// Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ReleaseCollection {
    releases: Vec<Release>,
}

impl ReleaseCollection {
    pub fn new(releases: Vec<Release>) -> Self {
        Self { releases }
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Newest release, or a zero-valued release when empty.
    pub fn first(&self) -> Release {
        self.releases.first().cloned().unwrap_or_default()
    }

    /// Version of the newest release, or `""` when empty.
    pub fn latest_version(&self) -> &str {
        self.releases
            .first()
            .map(|r| r.version.as_str())
            .unwrap_or_default()
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Release> {
        self.releases.iter()
    }
}

impl From<Vec<Release>> for ReleaseCollection {
    fn from(releases: Vec<Release>) -> Self {
        Self::new(releases)
    }
}

impl FromIterator<Release> for ReleaseCollection {
    fn from_iter<I: IntoIterator<Item = Release>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ReleaseCollection {
    type Item = Release;
    type IntoIter = std::vec::IntoIter<Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.releases.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReleaseCollection {
    type Item = &'a Release;
    type IntoIter = std::slice::Iter<'a, Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.releases.iter()
    }
}
