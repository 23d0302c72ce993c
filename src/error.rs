// src/error.rs

//! Unified error handling for the registry application.

use std::fmt;

use thiserror::Error;

use crate::storage::IndexSlot;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Latest-release probe failed
    #[error("Probe error for {context}: {message}")]
    Probe { context: String, message: String },

    /// Full release listing failed
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// Index slot absent or malformed
    #[error("Cannot read {slot} index: {message}")]
    Read { slot: IndexSlot, message: String },

    /// Index slot could not be written
    #[error("Cannot write {slot} index: {message}")]
    Persist { slot: IndexSlot, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a probe error with context.
    pub fn probe(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Probe {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a read error for an index slot.
    pub fn read(slot: IndexSlot, message: impl fmt::Display) -> Self {
        Self::Read {
            slot,
            message: message.to_string(),
        }
    }

    /// Create a persist error for an index slot.
    pub fn persist(slot: IndexSlot, message: impl fmt::Display) -> Self {
        Self::Persist {
            slot,
            message: message.to_string(),
        }
    }
}
