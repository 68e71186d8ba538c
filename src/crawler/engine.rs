//! Breadth-first traversal of a single site
//!
//! One engine owns everything mutable about one site's crawl: the frontier
//! queue, the visited set, the encoding candidates and the body cache. Many
//! engines run concurrently in one process without sharing state.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::time::Instant;

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::crawler::encoding::EncodingResolver;
use crate::crawler::links::extract_child_links;
use crate::crawler::site::SiteDescriptor;
use crate::fetch::{sniff_file_type, FetchCache, FetchError, DEFAULT_CRAWL_DELAY_SECS};
use crate::records::PageRecord;
use crate::robots::{fetch_robots, RobotsPolicy};
use crate::{HarvestError, Result};

/// URL path extensions skipped without a fetch
const EXCLUDED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "xml", "xlsx", "x-empty", "mp3", "mp4", "zip",
];

/// Breadth-first, robots-aware traversal engine for one site
///
/// Construction fetches and parses the site's robots.txt; traversal then
/// walks the site level by level up to the configured depth, recording every
/// retained page. The engine is consumed by a single [`traverse`] call per
/// crawl job.
///
/// [`traverse`]: TraversalEngine::traverse
pub struct TraversalEngine {
    site: SiteDescriptor,
    cache: FetchCache,
    robots: RobotsPolicy,
    robots_agent: String,
    crawl_delay: f64,
    resolver: EncodingResolver,
}

impl TraversalEngine {
    /// Prepares an engine for one site
    ///
    /// Opens the site's cache directory and fetches robots.txt. Either
    /// failure is fatal to the site's crawl and is propagated; per-page
    /// failures during traversal are not.
    ///
    /// # Arguments
    ///
    /// * `site` - The immutable per-crawl site descriptor
    /// * `raw_folder` - Root folder holding every site's body cache
    /// * `client` - Shared HTTP client
    /// * `robots_agent` - Product token matched against robots.txt groups
    pub async fn new(
        site: SiteDescriptor,
        raw_folder: &Path,
        client: Client,
        robots_agent: &str,
    ) -> Result<Self> {
        let cache = FetchCache::open(raw_folder, &site.host, client)?;

        let robots_delay = site.crawl_delay_override.unwrap_or(DEFAULT_CRAWL_DELAY_SECS);
        let robots = fetch_robots(&cache, &site.domain_prefix, robots_delay)
            .await
            .map_err(|e| HarvestError::Robots {
                site: site.name.clone(),
                message: e.to_string(),
            })?;

        let crawl_delay = site
            .crawl_delay_override
            .or_else(|| robots.crawl_delay(robots_agent))
            .unwrap_or(DEFAULT_CRAWL_DELAY_SECS);

        info!(
            site = %site.name,
            root = %site.root_url,
            crawl_delay,
            "Prepared traversal engine"
        );

        Ok(Self {
            site,
            cache,
            robots,
            robots_agent: robots_agent.to_string(),
            crawl_delay,
            resolver: EncodingResolver::new(),
        })
    }

    /// The descriptor this engine was built from
    pub fn site(&self) -> &SiteDescriptor {
        &self.site
    }

    /// Crawls the site breadth-first and returns its page records
    ///
    /// Runs until the frontier is empty or the count of collected pages
    /// (pages whose sniffed type is a target type) reaches the site's page
    /// limit. Per-URL failures are logged and skipped; nothing that happens
    /// to a single page aborts the crawl.
    ///
    /// # Returns
    ///
    /// Records for every retained page, in fetch order. HTML pages are
    /// always retained; other types only when they are target types.
    pub async fn traverse(&mut self) -> Vec<PageRecord> {
        let mut queue: VecDeque<(String, String, u32)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut records: Vec<PageRecord> = Vec::new();
        let mut collected: usize = 0;
        let start = Instant::now();

        queue.push_back((self.site.root_url.clone(), String::new(), 0));
        visited.insert(self.site.root_url.clone());

        loop {
            if queue.is_empty() {
                info!(
                    site = %self.site.name,
                    pages = collected,
                    elapsed = ?start.elapsed(),
                    "End crawling: frontier exhausted"
                );
                break;
            }
            if collected >= self.site.page_limit {
                info!(
                    site = %self.site.name,
                    pages = collected,
                    elapsed = ?start.elapsed(),
                    "End crawling: page limit reached"
                );
                break;
            }

            let Some((url, parent_url, depth)) = queue.pop_front() else {
                break;
            };

            if !self.robots.is_allowed(&url, &self.robots_agent) {
                debug!(site = %self.site.name, url, "Skipping robots-disallowed URL");
                continue;
            }

            // Links are enqueued unfiltered; the domain gate applies here,
            // when an entry is dequeued
            if !self.site.in_domain(&url) {
                continue;
            }

            let Ok(parsed_url) = Url::parse(&url) else {
                debug!(site = %self.site.name, url, "Skipping unparseable URL");
                continue;
            };

            if EXCLUDED_EXTENSIONS.contains(&path_extension(parsed_url.path()).as_str()) {
                continue;
            }

            let (body, save_path) = match self
                .cache
                .fetch(&url, self.site.refetch, self.crawl_delay)
                .await
            {
                Ok(fetched) => fetched,
                Err(FetchError::ConnectionFailed { .. }) => {
                    warn!(site = %self.site.name, url, "Cannot access URL: connection failed");
                    continue;
                }
                Err(error) => {
                    warn!(
                        site = %self.site.name,
                        url,
                        parent = parent_url,
                        %error,
                        "Cannot access URL"
                    );
                    continue;
                }
            };

            let mut file_type = sniff_file_type(&body);
            if file_type == "javascript" {
                // Script-served pages are HTML shells as far as traversal
                // and extraction are concerned
                file_type = "html".to_string();
            }

            let mut encoding = None;
            let mut child_url_list: Vec<String> = Vec::new();

            if file_type == "html" {
                let decoded = self.resolver.resolve(&body, &url, depth);
                encoding = decoded.encoding;

                // Nodes on the last level are fetched and recorded but
                // never expanded
                if depth + 1 < self.site.max_depth {
                    for link in extract_child_links(&decoded.text, &parsed_url) {
                        if visited.contains(&link) {
                            continue;
                        }
                        visited.insert(link.clone());
                        queue.push_back((link.clone(), url.clone(), depth + 1));
                        child_url_list.push(link);
                    }
                }
            }

            if self.site.is_target_type(&file_type) || file_type == "html" {
                records.push(PageRecord {
                    url: url.clone(),
                    parent_url,
                    child_url_list,
                    save_path: save_path.to_string_lossy().into_owned(),
                    site_name: self.site.name.clone(),
                    file_type: file_type.clone(),
                    encoding,
                    page_depth: depth,
                });
            }

            if self.site.is_target_type(&file_type) {
                collected += 1;
                if collected % self.site.log_interval == 0 {
                    info!(
                        site = %self.site.name,
                        pages = collected,
                        depth,
                        elapsed = ?start.elapsed(),
                        "Crawl progress"
                    );
                }
            }
        }

        records
    }
}

/// Reads a URL path's extension as its final dot-segment
///
/// Returns an empty string when the path has no dot or when the final
/// segment is longer than five characters (long tails are almost never real
/// extensions, e.g. `/news/breaking.story-of-the-day`).
fn path_extension(path: &str) -> String {
    let segments: Vec<&str> = path.split('.').collect();
    match segments.last() {
        Some(last) if segments.len() >= 2 && last.chars().count() <= 5 => (*last).to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_extension_reads_final_segment() {
        assert_eq!(path_extension("/news/today.html"), "html");
        assert_eq!(path_extension("/pic.jpg"), "jpg");
        assert_eq!(path_extension("/archive.2024.pdf"), "pdf");
    }

    #[test]
    fn test_path_extension_without_dot_is_typeless() {
        assert_eq!(path_extension("/news/today"), "");
        assert_eq!(path_extension("/"), "");
        assert_eq!(path_extension(""), "");
    }

    #[test]
    fn test_path_extension_long_tail_is_typeless() {
        assert_eq!(path_extension("/news/breaking.story-of-the-day"), "");
        assert_eq!(path_extension("/page.verylong"), "");
    }

    #[test]
    fn test_path_extension_trailing_dot() {
        assert_eq!(path_extension("/odd."), "");
    }

    #[test]
    fn test_excluded_extensions_cover_media_types() {
        for ext in ["jpg", "jpeg", "png", "xml", "xlsx", "x-empty", "mp3", "mp4", "zip"] {
            assert!(EXCLUDED_EXTENSIONS.contains(&ext));
        }
        assert!(!EXCLUDED_EXTENSIONS.contains(&"html"));
        assert!(!EXCLUDED_EXTENSIONS.contains(&"pdf"));
        assert!(!EXCLUDED_EXTENSIONS.contains(&""));
    }
}
