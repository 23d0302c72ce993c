// src/models/mod.rs

//! Domain models for the registry application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod github;
mod release;

// Re-export all public types
pub use config::{Config, FilterConfig, HttpConfig, OutputConfig, SourceConfig};
pub use github::{GitHubAsset, GitHubRelease};
pub use release::{Release, ReleaseCollection, UNCLASSIFIED_MAJOR, major_line};
