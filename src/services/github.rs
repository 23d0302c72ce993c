// src/services/github.rs

//! GitHub release fetcher.
//!
//! Pages through `GET {api_base}/releases` sequentially and keeps releases
//! that ship a `.tar.gz` archive.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, GitHubRelease, ReleaseCollection, SourceConfig};
use crate::services::ReleaseSource;
use crate::utils::http;

/// `ReleaseSource` backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubFetcher {
    api_base: String,
    client: Client,
    per_page: u32,
    page_delay: Duration,
}

impl GitHubFetcher {
    /// Create a fetcher with an existing HTTP client.
    pub fn new(source: &SourceConfig, client: Client) -> Result<Self> {
        // Reject malformed bases up front instead of on the first request.
        Url::parse(&source.api_base)?;

        Ok(Self {
            api_base: source.api_base.trim_end_matches('/').to_string(),
            client,
            per_page: source.per_page,
            page_delay: Duration::from_millis(source.page_delay_ms),
        })
    }

    /// Create a fetcher and its HTTP client from the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http::create_client(&config.http)?;
        Self::new(&config.source, client)
    }

    fn latest_url(&self) -> String {
        format!("{}/releases/latest", self.api_base)
    }

    fn page_url(&self, page: u32) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/releases", self.api_base))?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    /// Fetch a single page of releases.
    async fn fetch_page(&self, page: u32) -> Result<Vec<GitHubRelease>> {
        let url = self.page_url(page)?;
        let context = format!("page {page}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(&context, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(context, format!("HTTP {status}")));
        }

        response
            .json::<Vec<GitHubRelease>>()
            .await
            .map_err(|e| AppError::fetch(context, e))
    }
}

#[async_trait]
impl ReleaseSource for GitHubFetcher {
    async fn latest_tag_name(&self) -> Result<String> {
        let url = self.latest_url();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::probe(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::probe(url, format!("HTTP {status}")));
        }

        let latest: GitHubRelease = response
            .json()
            .await
            .map_err(|e| AppError::probe(&url, e))?;

        if latest.tag_name.is_empty() {
            return Err(AppError::probe(url, "empty tag_name"));
        }

        log::debug!("Latest remote release: {}", latest.tag_name);
        Ok(latest.tag_name)
    }

    async fn fetch_all(&self) -> Result<ReleaseCollection> {
        let mut releases = Vec::new();
        let mut page = 1;

        loop {
            log::info!("Reading page {}...", page);
            let remotes = self.fetch_page(page).await?;
            if remotes.is_empty() {
                break;
            }

            let before = releases.len();
            releases.extend(remotes.iter().filter_map(GitHubRelease::to_release));
            log::debug!(
                "Page {}: {} releases, {} with an archive",
                page,
                remotes.len(),
                releases.len() - before
            );

            page += 1;
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        log::info!("Fetched {} releases over {} pages", releases.len(), page - 1);
        Ok(ReleaseCollection::new(releases))
    }
}
