//! Preprocessing: from cached crawl output to the labeled dataset
//!
//! Reads the crawl's `page_list.jsonl` and the listing crawl's
//! `content_page_list.jsonl`, re-reads each cached body, runs content
//! extraction and publish-date estimation, assigns gold labels by membership
//! in the normalized content-URL set, and writes `dataset.jsonl`. Pages that
//! cannot be decoded with their recorded encoding are skipped with a
//! warning, never a crash.

mod dates;

pub use dates::estimate_publish_date;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use encoding_rs::Encoding;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::extract::extract;
use crate::output::{content_page_list_path, dataset_path, page_list_path, read_jsonl, write_jsonl};
use crate::records::{ContentPageEntry, PageLabel, PageRecord, ProcessedPageRecord};
use crate::{HarvestError, Result};

/// Decoded bodies of at most this many characters are flagged invalid
const MIN_VALID_PAGE_CHARS: usize = 100;

/// Lookup state shared by every preprocessing worker
struct PreprocessContext {
    /// Normalized URLs known to be content pages
    content_page_urls: HashSet<String>,
    /// Site name to dataset split, from the `[[site]]` config entries
    site_splits: HashMap<String, String>,
}

/// Normalizes a URL for content-page membership tests
///
/// Drops a trailing `index.htm`/`index.html` path segment and guarantees the
/// path ends with a slash, so directory-style and index-file spellings of the
/// same page compare equal. Unparseable input is returned unchanged.
pub fn normalize_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let mut path = parsed.path().to_string();
    if path.ends_with("index.htm") || path.ends_with("index.html") {
        if let Some(last_slash) = path.rfind('/') {
            path.truncate(last_slash);
        }
    }
    if !path.ends_with('/') {
        path.push('/');
    }

    parsed.set_path(&path);
    parsed.to_string()
}

/// Turns every crawled page into a labeled dataset row
///
/// Rows keep the input order of `page_list.jsonl`; extraction runs on blocking
/// worker chunks. The result lands in `dataset.jsonl` under the dataset folder
/// and is also returned.
///
/// # Errors
///
/// Fails when either input file is missing or malformed, or when the output
/// cannot be written. Per-page problems (missing cache file, undecodable
/// body) only drop that page.
pub async fn preprocess(config: &Config) -> Result<Vec<ProcessedPageRecord>> {
    let dataset_folder = PathBuf::from(&config.storage.dataset_folder);
    let page_records: Vec<PageRecord> = read_jsonl(&page_list_path(&dataset_folder))?;
    let content_entries: Vec<ContentPageEntry> =
        read_jsonl(&content_page_list_path(&dataset_folder))?;

    let content_page_urls: HashSet<String> = content_entries
        .iter()
        .map(|entry| normalize_url(&entry.url))
        .collect();
    let site_splits: HashMap<String, String> = config
        .site
        .iter()
        .map(|entry| (entry.name.clone(), entry.split.clone()))
        .collect();

    info!(
        pages = page_records.len(),
        content_urls = content_page_urls.len(),
        "Start preprocessing"
    );

    let context = Arc::new(PreprocessContext {
        content_page_urls,
        site_splits,
    });

    // Chunks are awaited in spawn order, so rows keep the input order
    let chunk_size = page_records
        .len()
        .div_ceil(config.crawler.max_workers)
        .max(1);
    let mut handles = Vec::new();
    for chunk in page_records.chunks(chunk_size) {
        let chunk = chunk.to_vec();
        let context = Arc::clone(&context);
        handles.push(tokio::task::spawn_blocking(move || {
            chunk
                .into_iter()
                .filter_map(|record| preprocess_page(record, &context))
                .collect::<Vec<_>>()
        }));
    }

    let mut processed = Vec::new();
    for handle in handles {
        let rows = handle
            .await
            .map_err(|e| HarvestError::Task(e.to_string()))?;
        processed.extend(rows);
    }

    let mut label_counts: BTreeMap<(String, &'static str), usize> = BTreeMap::new();
    for row in &processed {
        *label_counts
            .entry((row.page.site_name.clone(), row.label.as_str()))
            .or_default() += 1;
    }
    for ((site, label), pages) in label_counts {
        info!(site = %site, label, pages, "Label count");
    }

    std::fs::create_dir_all(&dataset_folder)?;
    let output_path = dataset_path(&dataset_folder);
    write_jsonl(&output_path, &processed)?;

    info!(
        rows = processed.len(),
        output = %output_path.display(),
        "Preprocessing finished"
    );
    Ok(processed)
}

/// Builds one dataset row from a crawled page, or drops it
fn preprocess_page(record: PageRecord, context: &PreprocessContext) -> Option<ProcessedPageRecord> {
    let Some(encoding_name) = record.encoding.as_deref() else {
        warn!(url = %record.url, "Skipping page without a recorded encoding");
        return None;
    };
    let Some(encoding) = Encoding::for_label(encoding_name.as_bytes()) else {
        warn!(
            url = %record.url,
            encoding = encoding_name,
            "Skipping page with an unknown encoding label"
        );
        return None;
    };

    let body = match std::fs::read(&record.save_path) {
        Ok(body) => body,
        Err(error) => {
            warn!(
                url = %record.url,
                path = %record.save_path,
                %error,
                "Skipping page with an unreadable cached body"
            );
            return None;
        }
    };

    let Some(html) = encoding.decode_without_bom_handling_and_without_replacement(&body) else {
        warn!(
            url = %record.url,
            encoding = encoding_name,
            "Skipping page whose body no longer decodes strictly"
        );
        return None;
    };

    let (segments, title) = extract(&html);

    let mut main_text = segments.join(" ");
    if !title.is_empty() {
        main_text = main_text.replace(&title, "");
    }
    let main_text = main_text.replace('\n', "").replace('"', "'");

    let publish_date = estimate_publish_date(&html);
    let valid_page = html.chars().count() > MIN_VALID_PAGE_CHARS;

    let split = context
        .site_splits
        .get(&record.site_name)
        .cloned()
        .unwrap_or_else(|| "none".to_string());

    // Gold labels exist only for the labeling splits; everything else is
    // unknown regardless of the content-page set
    let label = match split.as_str() {
        "dev" | "test" => {
            if context
                .content_page_urls
                .contains(&normalize_url(&record.url))
            {
                PageLabel::Contents
            } else {
                PageLabel::Index
            }
        }
        _ => PageLabel::Unknown,
    };

    Some(ProcessedPageRecord {
        page: record,
        title,
        main_text,
        publish_date,
        valid_page,
        label,
        split,
    })
}
