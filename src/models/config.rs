//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream release feed settings
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Where the indexes are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Smart index settings
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults.", path.display());
            return Self::default();
        }

        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let api_base = Url::parse(&self.source.api_base)?;
        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "source.api_base must be http(s), got {}",
                api_base.scheme()
            )));
        }
        if self.source.per_page == 0 || self.source.per_page > 100 {
            return Err(AppError::validation("source.per_page must be in 1..=100"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.output.full_index_file.trim().is_empty()
            || self.output.smart_index_file.trim().is_empty()
        {
            return Err(AppError::validation("output index file names must be set"));
        }
        if self.output.full_index_file == self.output.smart_index_file {
            return Err(AppError::validation(
                "output.full_index_file and output.smart_index_file must differ",
            ));
        }
        if self.filter.keep_recent == 0 {
            return Err(AppError::validation("filter.keep_recent must be > 0"));
        }
        Ok(())
    }
}

/// Upstream GitHub repository settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Repository API base, e.g. `https://api.github.com/repos/{owner}/{repo}`
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Releases requested per page
    #[serde(default = "defaults::per_page")]
    pub per_page: u32,

    /// Delay between page requests in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            per_page: defaults::per_page(),
            page_delay_ms: defaults::page_delay(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Output location of the two index slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,

    #[serde(default = "defaults::full_index_file")]
    pub full_index_file: String,

    #[serde(default = "defaults::smart_index_file")]
    pub smart_index_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            full_index_file: defaults::full_index_file(),
            smart_index_file: defaults::smart_index_file(),
        }
    }
}

/// Smart index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Number of newest releases always kept verbatim
    #[serde(default = "defaults::keep_recent")]
    pub keep_recent: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keep_recent: defaults::keep_recent(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn api_base() -> String {
        "https://api.github.com/repos/GloriousEggroll/proton-ge-custom".into()
    }
    pub fn per_page() -> u32 {
        100
    }
    pub fn page_delay() -> u64 {
        200
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Proton-Registry-Bot".into()
    }
    pub fn timeout() -> u64 {
        60
    }

    // Output defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("public/api")
    }
    pub fn full_index_file() -> String {
        "full_index.json".into()
    }
    pub fn smart_index_file() -> String {
        "smart_index.json".into()
    }

    // Filter defaults
    pub fn keep_recent() -> usize {
        10
    }
}
