//! GitHub REST API release payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::release::{Release, major_line};

/// A release as returned by `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

impl GitHubAsset {
    /// Whether this asset is the distributable archive (not a checksum).
    pub fn is_archive(&self) -> bool {
        self.name.ends_with(".tar.gz") && !self.name.contains("sha512")
    }
}

impl GitHubRelease {
    /// First distributable archive attached to the release.
    pub fn archive(&self) -> Option<&GitHubAsset> {
        self.assets.iter().find(|a| a.is_archive())
    }

    /// Convert into a release record, or `None` when there is no archive.
    pub fn to_release(&self) -> Option<Release> {
        let archive = self.archive()?;

        Some(Release {
            version: self.tag_name.clone(),
            download_url: archive.browser_download_url.clone(),
            size: archive.size,
            date: self
                .published_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            major: major_line(&self.tag_name),
        })
    }
}
