use serde::Deserialize;

/// Main configuration structure for Page-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub site: Vec<SiteEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum BFS depth; pages at `max-depth - 1` are fetched but not expanded
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Stop a site's crawl once this many target-type pages were collected
    #[serde(rename = "page-limit")]
    pub page_limit: usize,

    /// Sniffed file types that count toward the page limit
    #[serde(rename = "target-file-types")]
    pub target_file_types: Vec<String>,

    /// Force re-download of pages already present in the body cache
    #[serde(rename = "refetch-pages", default)]
    pub refetch_pages: bool,

    /// Emit a progress log line every this many collected pages
    #[serde(rename = "log-interval", default = "default_log_interval")]
    pub log_interval: usize,

    /// Number of site crawls allowed to run concurrently
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_log_interval() -> usize {
    100
}

fn default_max_workers() -> usize {
    16
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// On-disk layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root of the per-site body cache directories
    #[serde(rename = "raw-folder")]
    pub raw_folder: String,

    /// Directory receiving the JSONL dataset files
    #[serde(rename = "dataset-folder")]
    pub dataset_folder: String,
}

/// One site to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Display name, also the key for listing-strategy dispatch
    pub name: String,

    /// Root URL the BFS starts from; also defines the in-domain prefix
    pub url: String,

    /// Dataset partition (`dev` and `test` sites get gold labels)
    #[serde(default = "default_split")]
    pub split: String,

    /// Seconds to wait before each fetch, overriding robots.txt
    #[serde(rename = "crawl-delay")]
    pub crawl_delay: Option<f64>,
}

fn default_split() -> String {
    "none".to_string()
}
