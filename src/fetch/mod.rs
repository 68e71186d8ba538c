//! Fetching and local body storage
//!
//! This module owns all network access for the crawler:
//! - Building the shared HTTP client with an identifying user agent
//! - The bounded retry loop with a crawl-delay sleep before every attempt
//! - The per-site on-disk body cache keyed by URL
//! - File-type sniffing from fetched bytes

mod cache;
mod client;
mod sniff;

pub use cache::{site_folder_name, url_key, FetchCache};
pub use client::{
    build_http_client, fetch_with_retries, DEFAULT_CRAWL_DELAY_SECS, MAX_FETCH_ATTEMPTS,
    MIN_BODY_BYTES,
};
pub use sniff::sniff_file_type;

use thiserror::Error;

/// Fetch and cache errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt in the retry budget failed; `last` carries the final
    /// diagnostic (timeout, refused connection, undersized body, ...).
    #[error("Connection failed for {url} after {attempts} attempts: {last}")]
    ConnectionFailed {
        url: String,
        attempts: usize,
        last: String,
    },

    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;
