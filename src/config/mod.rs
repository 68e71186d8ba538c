//! Configuration module for Page-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use page_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config/sites.toml")).unwrap();
//! println!("Crawling {} sites", config.site.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, SiteEntry, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::load_config;
