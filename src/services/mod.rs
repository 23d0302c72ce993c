//! Service layer for the registry application.
//!
//! - `ReleaseSource`: where release listings come from
//! - `GitHubFetcher`: `ReleaseSource` over the GitHub REST API

mod github;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ReleaseCollection;

pub use github::GitHubFetcher;

/// Remote release feed.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Tag of the newest published release, via a single lightweight request.
    async fn latest_tag_name(&self) -> Result<String>;

    /// Every release with a distributable archive, newest first.
    async fn fetch_all(&self) -> Result<ReleaseCollection>;
}
