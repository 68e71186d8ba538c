//! Dataset record types
//!
//! These are the rows of the three JSONL files the pipeline exchanges:
//! `page_list.jsonl` (crawl output), `content_page_list.jsonl` (listing
//! output), and `dataset.jsonl` (preprocessed output).

use serde::{Deserialize, Serialize};

/// One retained page from a site crawl.
///
/// Created by the traversal engine when a fetched page qualifies for
/// retention, and never mutated afterwards. `child_url_list` holds the
/// outbound links in discovery order, already deduplicated against the
/// engine's visited set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,

    /// URL of the page whose link discovered this one; empty for the root.
    pub parent_url: String,

    pub child_url_list: Vec<String>,

    /// Local path of the cached body this record was built from.
    pub save_path: String,

    pub site_name: String,

    /// Sniffed file type (from bytes, not the URL extension).
    pub file_type: String,

    /// Encoding that decoded the body, or `None` when decoding fell back to
    /// lossy text (and for non-HTML pages, which are never decoded).
    pub encoding: Option<String>,

    pub page_depth: u32,
}

/// Gold page-type label assigned during preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLabel {
    /// The URL is in the site's known content-page list.
    Contents,
    /// A labeled site's page outside the content list.
    Index,
    /// The site carries no labeling split.
    Unknown,
}

impl PageLabel {
    /// The label as it appears in the serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageLabel::Contents => "contents",
            PageLabel::Index => "index",
            PageLabel::Unknown => "unknown",
        }
    }
}

/// One known content-page URL collected by the listing crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPageEntry {
    pub url: String,
    pub site_name: String,
}

/// A crawled page enriched with the fields the classifier trains on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedPageRecord {
    #[serde(flatten)]
    pub page: PageRecord,

    /// Title selected by the content extractor (may be empty).
    pub title: String,

    /// Accepted body segments joined into one line of plain text.
    pub main_text: String,

    /// `YYYY-MM-DD` when a publish date was found in the markup.
    pub publish_date: Option<String>,

    /// False when the decoded body is 100 characters or fewer.
    pub valid_page: bool,

    pub label: PageLabel,

    /// Dataset partition inherited from the site entry (e.g. `dev`, `test`).
    pub split: String,
}
