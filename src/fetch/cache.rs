//! Per-site on-disk body cache
//!
//! Every fetched body lands in one directory per site, one file per URL.
//! Interrupted crawls restart cheaply: a cached URL is served from disk with
//! no network access unless a re-fetch is forced.

use crate::fetch::client::{fetch_with_retries, MAX_FETCH_ATTEMPTS};
use crate::fetch::FetchResult;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Keys longer than this are truncated and given a digest tail
const MAX_KEY_CHARS: usize = 220;

/// Characters of the original key kept in front of the truncation marker
const KEY_PREFIX_CHARS: usize = 200;

/// Derives the cache directory name for a site from its host
///
/// Slashes and dots are normalized so the name is safe as a single path
/// component (e.g. `www.example.com` becomes `www-example-com`).
pub fn site_folder_name(host: &str) -> String {
    host.replace('/', "-").replace('.', "-")
}

/// Derives the cache file name for a URL
///
/// Slashes become underscores so the key is a single path component. Keys
/// beyond [`MAX_KEY_CHARS`] keep their first [`KEY_PREFIX_CHARS`] characters
/// followed by a `---` marker and 16 hex characters of the full URL's
/// SHA-256, so over-long URLs stay distinguishable and the derivation stays
/// reproducible across runs.
pub fn url_key(url: &str) -> String {
    let key: String = url
        .chars()
        .map(|c| if c == '/' { '_' } else { c })
        .collect();

    if key.chars().count() <= MAX_KEY_CHARS {
        return key;
    }

    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());

    let prefix: String = key.chars().take(KEY_PREFIX_CHARS).collect();
    format!("{}---{}", prefix, &digest[..16])
}

/// On-disk body cache for one site
///
/// Holds the site's cache directory and the shared HTTP client. All access
/// is sequential within one traversal engine; different sites use disjoint
/// directories, so no locking exists anywhere in here.
pub struct FetchCache {
    site_dir: PathBuf,
    client: Client,
}

impl FetchCache {
    /// Opens (creating if needed) the cache directory for a site
    ///
    /// Failure to create the directory is fatal to the site's crawl and is
    /// propagated to the caller.
    pub fn open(raw_folder: &Path, site_host: &str, client: Client) -> FetchResult<Self> {
        let site_dir = raw_folder.join(site_folder_name(site_host));
        std::fs::create_dir_all(&site_dir)?;
        Ok(Self { site_dir, client })
    }

    /// The site's cache directory
    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }

    /// The path a URL's body is (or would be) stored at
    pub fn save_path(&self, url: &str) -> PathBuf {
        self.site_dir.join(url_key(url))
    }

    /// Fetches a URL through the cache
    ///
    /// A cached body is returned as-is with zero network access unless
    /// `refetch` forces a re-download. Real fetches go through the bounded
    /// retry loop and are persisted before being returned.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `refetch` - Force a re-download even when a cached body exists
    /// * `crawl_delay` - Seconds slept before each network attempt
    ///
    /// # Returns
    ///
    /// The body bytes and the path they are stored at.
    pub async fn fetch(
        &self,
        url: &str,
        refetch: bool,
        crawl_delay: f64,
    ) -> FetchResult<(Vec<u8>, PathBuf)> {
        let path = self.save_path(url);

        if !refetch && path.is_file() {
            let body = std::fs::read(&path)?;
            return Ok((body, path));
        }

        let body = fetch_with_retries(&self.client, url, crawl_delay, MAX_FETCH_ATTEMPTS).await?;
        std::fs::write(&path, &body)?;
        Ok((body, path))
    }

    /// Fetches a URL without touching the cache
    ///
    /// Used for robots.txt, which is re-read at every engine construction
    /// and must not leave a body file behind.
    pub async fn fetch_fresh(&self, url: &str, crawl_delay: f64) -> FetchResult<Vec<u8>> {
        fetch_with_retries(&self.client, url, crawl_delay, MAX_FETCH_ATTEMPTS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserAgentConfig;
    use crate::fetch::build_http_client;
    use tempfile::TempDir;

    fn test_client() -> Client {
        build_http_client(&UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_site_folder_name() {
        assert_eq!(site_folder_name("www.example.com"), "www-example-com");
        assert_eq!(site_folder_name("127.0.0.1:8080"), "127-0-0-1:8080");
    }

    #[test]
    fn test_url_key_short_urls_pass_through() {
        assert_eq!(
            url_key("https://example.com/news/today"),
            "https:__example.com_news_today"
        );
    }

    #[test]
    fn test_url_key_long_urls_are_truncated_with_digest() {
        let url = format!("https://example.com/{}", "a".repeat(300));
        let key = url_key(&url);

        assert!(key.chars().count() <= MAX_KEY_CHARS);
        assert!(key.contains("---"));
        assert!(!key.contains('/'));
        // Reproducible across calls
        assert_eq!(key, url_key(&url));
    }

    #[test]
    fn test_url_key_long_urls_stay_distinguishable() {
        // Same first 200 characters, different tails
        let base = format!("https://example.com/{}", "a".repeat(260));
        let url_a = format!("{}?page=1", base);
        let url_b = format!("{}?page=2", base);

        assert_ne!(url_key(&url_a), url_key(&url_b));
    }

    #[tokio::test]
    async fn test_cached_body_is_served_without_network() {
        let dir = TempDir::new().unwrap();
        let cache = FetchCache::open(dir.path(), "example.com", test_client()).unwrap();

        // Seed the cache; the URL points nowhere reachable, so any network
        // attempt would fail the test
        let url = "http://127.0.0.1:9/cached-page";
        std::fs::write(cache.save_path(url), b"seeded body").unwrap();

        let (body, path) = cache.fetch(url, false, 0.0).await.unwrap();
        assert_eq!(body, b"seeded body");
        assert_eq!(path, cache.save_path(url));
    }

    #[tokio::test]
    async fn test_refetch_bypasses_cache() {
        let dir = TempDir::new().unwrap();
        let cache = FetchCache::open(dir.path(), "example.com", test_client()).unwrap();

        let url = "http://127.0.0.1:9/cached-page";
        std::fs::write(cache.save_path(url), b"seeded body").unwrap();

        // With refetch forced the unreachable URL must produce an error
        let result = cache.fetch(url, true, 0.0).await;
        assert!(result.is_err());
    }
}
