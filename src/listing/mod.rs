//! Listing crawl: bulk collection of known content-page URLs
//!
//! Complements the breadth-first crawl with per-site strategies that
//! enumerate published articles directly, from XML sitemaps or from
//! page-numbered archive listings. Listing fetches share the retry loop and
//! the on-disk cache (under a `listing/` subfolder of the raw folder) but do
//! not consult robots.txt; the per-site crawl delay still applies.

mod strategy;

pub use strategy::{strategy_for_site, ListingStrategy};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::crawler::{resolve_child_link, SiteDescriptor};
use crate::fetch::{build_http_client, FetchCache, DEFAULT_CRAWL_DELAY_SECS};
use crate::output::{content_page_list_path, write_jsonl};
use crate::records::ContentPageEntry;
use crate::{HarvestError, Result};

/// Upper bound on listing pages fetched per site in one run
const MAX_LISTING_PAGES: usize = 1_000_000;

/// Progress log cadence, in listing pages
const LISTING_LOG_INTERVAL: usize = 100;

/// `<loc>` entries inside a sitemap document
static LOC_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<loc>(.*?)</loc>").unwrap());

/// Collects known content-page URLs for every configured site
///
/// Sites run concurrently under the same worker limit as the page crawl.
/// A site whose name has no registered [`ListingStrategy`] is skipped with a
/// warning; per-page fetch failures inside a strategy are logged and skipped.
///
/// Entries land in `content_page_list.jsonl` under the dataset folder and
/// are also returned, merged in site completion order.
pub async fn collect_listings(config: &Config) -> Result<Vec<ContentPageEntry>> {
    let client = build_http_client(&config.user_agent)?;
    let listing_folder = PathBuf::from(&config.storage.raw_folder).join("listing");
    let semaphore = Arc::new(Semaphore::new(config.crawler.max_workers));
    let mut tasks: JoinSet<Result<Vec<ContentPageEntry>>> = JoinSet::new();

    for entry in &config.site {
        let Some(strategy) = strategy_for_site(&entry.name) else {
            warn!(site = %entry.name, "No listing strategy registered, skipping site");
            continue;
        };
        let site = SiteDescriptor::from_config(entry, &config.crawler)?;
        let client = client.clone();
        let listing_folder = listing_folder.clone();
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| HarvestError::Task(e.to_string()))?;

            let cache = FetchCache::open(&listing_folder, &site.host, client)?;
            let entries = collect_site_listings(&cache, &site, &strategy).await;
            info!(site = %site.name, urls = entries.len(), "Site listing finished");
            Ok(entries)
        });
    }

    let mut all_entries = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let entries = joined.map_err(|e| HarvestError::Task(e.to_string()))??;
        all_entries.extend(entries);
    }

    let mut per_site: BTreeMap<String, usize> = BTreeMap::new();
    for entry in &all_entries {
        *per_site.entry(entry.site_name.clone()).or_default() += 1;
    }
    for (site, urls) in per_site {
        info!(site = %site, urls, "Listing total");
    }

    let dataset_folder = PathBuf::from(&config.storage.dataset_folder);
    std::fs::create_dir_all(&dataset_folder)?;
    let listing_path = content_page_list_path(&dataset_folder);
    write_jsonl(&listing_path, &all_entries)?;

    info!(
        urls = all_entries.len(),
        output = %listing_path.display(),
        "Listing crawl finished"
    );
    Ok(all_entries)
}

/// Runs one site's strategy against its listing cache
async fn collect_site_listings(
    cache: &FetchCache,
    site: &SiteDescriptor,
    strategy: &ListingStrategy,
) -> Vec<ContentPageEntry> {
    let crawl_delay = site.crawl_delay_override.unwrap_or(DEFAULT_CRAWL_DELAY_SECS);
    match strategy {
        ListingStrategy::SitemapXml { sitemap_urls } => {
            collect_from_sitemaps(cache, site, sitemap_urls, crawl_delay).await
        }
        ListingStrategy::PagedListing {
            url_template,
            pages,
            selector,
        } => collect_from_paged(cache, site, url_template, *pages, selector, crawl_delay).await,
    }
}

/// Walks sitemap indexes down to their article sitemaps
///
/// Both levels keep only `<loc>` URLs under the site's own prefix; sitemap
/// bodies are XML the site itself serves, so a lossy UTF-8 view is enough.
async fn collect_from_sitemaps(
    cache: &FetchCache,
    site: &SiteDescriptor,
    sitemap_urls: &[&str],
    crawl_delay: f64,
) -> Vec<ContentPageEntry> {
    let start = Instant::now();

    let mut article_sitemaps: Vec<String> = Vec::new();
    for sitemap_url in sitemap_urls {
        match cache.fetch(sitemap_url, site.refetch, crawl_delay).await {
            Ok((body, _)) => {
                let text = String::from_utf8_lossy(&body);
                article_sitemaps.extend(extract_loc_urls(&text, &site.domain_prefix));
            }
            Err(error) => {
                warn!(site = %site.name, url = %sitemap_url, %error, "Cannot fetch sitemap index");
            }
        }
    }
    article_sitemaps.truncate(MAX_LISTING_PAGES);

    let mut entries = Vec::new();
    for (number, link) in article_sitemaps.iter().enumerate() {
        match cache.fetch(link, site.refetch, crawl_delay).await {
            Ok((body, _)) => {
                let text = String::from_utf8_lossy(&body);
                for url in extract_loc_urls(&text, &site.domain_prefix) {
                    entries.push(ContentPageEntry {
                        url,
                        site_name: site.name.clone(),
                    });
                }
            }
            Err(error) => {
                warn!(site = %site.name, url = %link, %error, "Cannot fetch article sitemap");
            }
        }

        if (number + 1) % LISTING_LOG_INTERVAL == 0 {
            info!(
                site = %site.name,
                pages = number + 1,
                elapsed = ?start.elapsed(),
                "Listing progress"
            );
        }
    }

    info!(
        site = %site.name,
        pages = article_sitemaps.len(),
        elapsed = ?start.elapsed(),
        "End listing"
    );
    entries
}

/// Walks a page-numbered archive, scraping article anchors per page
async fn collect_from_paged(
    cache: &FetchCache,
    site: &SiteDescriptor,
    url_template: &str,
    pages: u32,
    selector: &str,
    crawl_delay: f64,
) -> Vec<ContentPageEntry> {
    let Ok(anchor_selector) = Selector::parse(selector) else {
        warn!(site = %site.name, selector, "Invalid listing selector, skipping site");
        return Vec::new();
    };

    let start = Instant::now();
    let page_count = (pages as usize).min(MAX_LISTING_PAGES);
    let mut entries = Vec::new();

    for page in 1..=page_count {
        let listing_url = url_template.replace("{page}", &page.to_string());
        let Ok(listing_page_url) = Url::parse(&listing_url) else {
            warn!(site = %site.name, url = %listing_url, "Listing template produced an invalid URL");
            break;
        };

        match cache.fetch(&listing_url, site.refetch, crawl_delay).await {
            Ok((body, _)) => {
                let text = String::from_utf8_lossy(&body);
                for url in scrape_listing_anchors(&text, &anchor_selector, &listing_page_url) {
                    entries.push(ContentPageEntry {
                        url,
                        site_name: site.name.clone(),
                    });
                }
            }
            Err(error) => {
                warn!(site = %site.name, url = %listing_url, %error, "Cannot fetch listing page");
            }
        }

        if page % LISTING_LOG_INTERVAL == 0 {
            info!(
                site = %site.name,
                pages = page,
                elapsed = ?start.elapsed(),
                "Listing progress"
            );
        }
    }

    info!(
        site = %site.name,
        pages = page_count,
        elapsed = ?start.elapsed(),
        "End listing"
    );
    entries
}

/// Pulls `<loc>` URLs out of a sitemap document, keeping only those under
/// the site's `scheme://authority/` prefix
fn extract_loc_urls(xml: &str, domain_prefix: &str) -> Vec<String> {
    let prefix = format!("{}/", domain_prefix);
    LOC_TAG
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|loc| loc.starts_with(&prefix))
        .map(str::to_string)
        .collect()
}

/// Collects anchor targets matching `selector`, resolved against the
/// listing page's URL
fn scrape_listing_anchors(html: &str, selector: &Selector, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_child_link(href, page_url))
        .collect()
}
