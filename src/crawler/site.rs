//! Per-site crawl parameters

use crate::config::{CrawlerConfig, SiteEntry};
use crate::HarvestError;
use url::Url;

/// Immutable description of one site crawl
///
/// Built once from the site's config entry plus the global crawler settings;
/// engines only ever read it.
#[derive(Debug, Clone)]
pub struct SiteDescriptor {
    /// Display name, also the listing-strategy key
    pub name: String,

    /// URL the BFS starts from
    pub root_url: String,

    /// `scheme://authority` of the root; URLs outside this prefix are skipped
    pub domain_prefix: String,

    /// Host (with port, when present) used for the cache directory name
    pub host: String,

    pub max_depth: u32,

    /// Sniffed types counting toward `page_limit`
    pub target_file_types: Vec<String>,

    /// Stop after this many collected target-type pages
    pub page_limit: usize,

    /// Overrides the robots.txt crawl delay when set
    pub crawl_delay_override: Option<f64>,

    /// Force re-download of cached bodies
    pub refetch: bool,

    /// Progress log cadence, in collected pages
    pub log_interval: usize,

    /// Dataset partition carried through to preprocessing
    pub split: String,
}

impl SiteDescriptor {
    /// Derives a descriptor from config
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Site`] when the root URL does not parse or has
    /// no host.
    pub fn from_config(entry: &SiteEntry, crawler: &CrawlerConfig) -> Result<Self, HarvestError> {
        let root_url = entry.url.trim().to_string();

        let parsed = Url::parse(&root_url).map_err(|e| HarvestError::Site {
            name: entry.name.clone(),
            message: format!("invalid root URL '{}': {}", root_url, e),
        })?;

        let host = parsed.host_str().ok_or_else(|| HarvestError::Site {
            name: entry.name.clone(),
            message: format!("root URL '{}' has no host", root_url),
        })?;

        // Keep the port: it distinguishes the authority both in the in-domain
        // prefix and in the cache directory name
        let authority = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let domain_prefix = format!("{}://{}", parsed.scheme(), authority);

        Ok(Self {
            name: entry.name.clone(),
            root_url,
            domain_prefix,
            host: authority,
            max_depth: crawler.max_depth,
            target_file_types: crawler.target_file_types.clone(),
            page_limit: crawler.page_limit,
            crawl_delay_override: entry.crawl_delay,
            refetch: crawler.refetch_pages,
            log_interval: crawler.log_interval,
            split: entry.split.clone(),
        })
    }

    /// In-domain restriction: the crawl never leaves the root's prefix
    pub fn in_domain(&self, url: &str) -> bool {
        url.starts_with(&self.domain_prefix)
    }

    /// True when a sniffed file type counts toward the page limit
    pub fn is_target_type(&self, file_type: &str) -> bool {
        self.target_file_types.iter().any(|t| t == file_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler_config() -> CrawlerConfig {
        CrawlerConfig {
            max_depth: 8,
            page_limit: 1000,
            target_file_types: vec!["html".to_string()],
            refetch_pages: false,
            log_interval: 100,
            max_workers: 16,
        }
    }

    fn entry(url: &str) -> SiteEntry {
        SiteEntry {
            name: "Example".to_string(),
            url: url.to_string(),
            split: "dev".to_string(),
            crawl_delay: None,
        }
    }

    #[test]
    fn test_from_config_derives_prefix() {
        let site = SiteDescriptor::from_config(&entry("https://www.example.com/news"), &crawler_config())
            .unwrap();
        assert_eq!(site.domain_prefix, "https://www.example.com");
        assert_eq!(site.host, "www.example.com");
        assert!(site.in_domain("https://www.example.com/news/today"));
        assert!(!site.in_domain("https://other.example.com/news"));
    }

    #[test]
    fn test_from_config_keeps_port() {
        let site =
            SiteDescriptor::from_config(&entry("http://127.0.0.1:8080"), &crawler_config()).unwrap();
        assert_eq!(site.domain_prefix, "http://127.0.0.1:8080");
        assert_eq!(site.host, "127.0.0.1:8080");
        assert!(site.in_domain("http://127.0.0.1:8080/page"));
    }

    #[test]
    fn test_from_config_rejects_bad_urls() {
        assert!(SiteDescriptor::from_config(&entry("not a url"), &crawler_config()).is_err());
        assert!(SiteDescriptor::from_config(&entry("data:text/plain,x"), &crawler_config()).is_err());
    }

    #[test]
    fn test_is_target_type() {
        let site = SiteDescriptor::from_config(&entry("https://example.com"), &crawler_config())
            .unwrap();
        assert!(site.is_target_type("html"));
        assert!(!site.is_target_type("pdf"));
    }
}
