//! Robots.txt handling
//!
//! Each traversal engine fetches its site's robots.txt once at construction
//! and consults the parsed policy before every page fetch. The robots body
//! itself is never cached on disk.

mod policy;

pub use policy::RobotsPolicy;

use crate::fetch::{FetchCache, FetchResult};

/// Fetches and parses a site's robots.txt
///
/// The fetch goes through the uncached retry loop; a fetch failure after the
/// full retry budget is fatal to the site's engine and propagates to the
/// caller. The body is decoded lossily since robots files in the wild carry
/// all sorts of encodings.
///
/// # Arguments
///
/// * `cache` - The site's fetch cache (supplies the client and retry loop)
/// * `domain_prefix` - `scheme://host` of the site
/// * `crawl_delay` - Seconds slept before each fetch attempt
pub async fn fetch_robots(
    cache: &FetchCache,
    domain_prefix: &str,
    crawl_delay: f64,
) -> FetchResult<RobotsPolicy> {
    let robots_url = format!("{}/robots.txt", domain_prefix.trim_end_matches('/'));
    let body = cache.fetch_fresh(&robots_url, crawl_delay).await?;
    let content = String::from_utf8_lossy(&body);
    Ok(RobotsPolicy::from_content(&content))
}
