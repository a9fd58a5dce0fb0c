//! Sumi-Harvest: a bounded-concurrency content fetcher
//!
//! This crate downloads a fixed list of seed URLs with a bounded pool of
//! workers, strips the markup down to plain text, classifies the text by
//! keyword, appends it to per-URL output files, and checkpoints the set of
//! visited URLs so an interrupted run can resume.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Maximum length of a URL in bytes
pub const MAX_URL_LENGTH: usize = 1024;

/// Main error type for Sumi-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching a single URL
///
/// These never leave the worker that produced them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Fetch of {url} cancelled")]
    Cancelled { url: String },
}

/// Result type alias for Sumi-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Dispatcher, DispatchSummary};
pub use extract::{classify, strip, Category};
pub use state::VisitedRegistry;
pub use storage::CheckpointStore;
