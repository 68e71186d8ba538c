//! Page-Harvest: a news-page dataset crawler
//!
//! This crate crawls configured news sites breadth-first, separates index
//! pages from article pages, and derives a labeled page-type dataset from the
//! crawled bodies. It respects robots.txt, per-site crawl delays, and keeps a
//! local body cache so interrupted runs resume without re-downloading.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod output;
pub mod preprocess;
pub mod records;
pub mod robots;

use thiserror::Error;

/// Main error type for Page-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Robots.txt unavailable for {site}: {message}")]
    Robots { site: String, message: String },

    #[error("Invalid site entry '{name}': {message}")]
    Site { name: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Record serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Task(String),
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

/// Result type alias for Page-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, SiteDescriptor, TraversalEngine};
pub use extract::{extract, ExtractOptions};
pub use listing::collect_listings;
pub use preprocess::preprocess;
pub use records::{ContentPageEntry, PageRecord, ProcessedPageRecord};
