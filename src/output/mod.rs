//! Dataset file outputs
//!
//! Every stage of the pipeline reads and writes JSONL files under the
//! configured dataset folder: the crawl emits `page_list.jsonl`, the listing
//! crawler `content_page_list.jsonl`, and preprocessing the final
//! `dataset.jsonl`.

mod jsonl;
mod summary;

pub use jsonl::{read_jsonl, write_jsonl};
pub use summary::{print_summary, summarize_records, CrawlSummary};

use std::path::{Path, PathBuf};

/// Path of the crawl's page record list
pub fn page_list_path(dataset_folder: &Path) -> PathBuf {
    dataset_folder.join("page_list.jsonl")
}

/// Path of the listing crawler's content page list
pub fn content_page_list_path(dataset_folder: &Path) -> PathBuf {
    dataset_folder.join("content_page_list.jsonl")
}

/// Path of the final labeled dataset
pub fn dataset_path(dataset_folder: &Path) -> PathBuf {
    dataset_folder.join("dataset.jsonl")
}
