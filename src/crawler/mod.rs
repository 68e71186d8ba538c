//! Site traversal and crawl orchestration
//!
//! A [`SiteDescriptor`] freezes one site's crawl parameters, a
//! [`TraversalEngine`] walks that site breadth-first, and [`run_crawl`]
//! fans the configured sites out over a bounded worker pool and merges
//! their page records.

mod encoding;
mod engine;
mod links;
mod site;

pub use encoding::{sniff_encoding, DecodedPage, EncodingResolver};
pub use engine::TraversalEngine;
pub use links::{extract_child_links, resolve_child_link};
pub use site::SiteDescriptor;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

use crate::config::Config;
use crate::fetch::build_http_client;
use crate::output::{page_list_path, write_jsonl};
use crate::records::PageRecord;
use crate::{HarvestError, Result};

/// Crawls every configured site and writes the merged page records
///
/// Sites run concurrently, at most `max_workers` at a time; each gets its
/// own traversal engine and cache directory. A site engine that cannot be
/// constructed (storage directory or robots.txt unavailable) aborts the
/// whole crawl; per-page failures inside a running engine do not.
///
/// Records land in `page_list.jsonl` under the dataset folder and are also
/// returned. They are merged in site completion order; callers needing a
/// stable order should sort by `site_name`.
///
/// # Example
///
/// ```no_run
/// use page_harvest::{config::load_config, run_crawl};
/// use std::path::Path;
///
/// # async fn example() -> page_harvest::Result<()> {
/// let config = load_config(Path::new("config/sites.toml"))?;
/// let records = run_crawl(&config).await?;
/// println!("collected {} pages", records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<Vec<PageRecord>> {
    let client = build_http_client(&config.user_agent)?;
    let raw_folder = PathBuf::from(&config.storage.raw_folder);
    let semaphore = Arc::new(Semaphore::new(config.crawler.max_workers));
    let mut tasks: JoinSet<Result<Vec<PageRecord>>> = JoinSet::new();

    for entry in &config.site {
        let site = SiteDescriptor::from_config(entry, &config.crawler)?;
        let client = client.clone();
        let raw_folder = raw_folder.clone();
        let semaphore = Arc::clone(&semaphore);
        let robots_agent = config.user_agent.crawler_name.clone();

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| HarvestError::Task(e.to_string()))?;

            let mut engine = TraversalEngine::new(site, &raw_folder, client, &robots_agent).await?;
            let records = engine.traverse().await;
            info!(
                site = %engine.site().name,
                pages = records.len(),
                "Site crawl finished"
            );
            Ok(records)
        });
    }

    let mut all_records = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let records = joined.map_err(|e| HarvestError::Task(e.to_string()))??;
        all_records.extend(records);
    }

    let dataset_folder = PathBuf::from(&config.storage.dataset_folder);
    std::fs::create_dir_all(&dataset_folder)?;
    let page_list = page_list_path(&dataset_folder);
    write_jsonl(&page_list, &all_records)?;

    info!(
        sites = config.site.len(),
        pages = all_records.len(),
        output = %page_list.display(),
        "Crawl finished"
    );
    Ok(all_records)
}
