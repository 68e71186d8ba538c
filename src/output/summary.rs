//! Aggregate counts over a crawl's page records

use std::collections::HashMap;

use crate::records::PageRecord;

/// Crawl summary counts
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Total retained pages across all sites
    pub total_pages: usize,

    /// Retained page count per site
    pub pages_by_site: HashMap<String, usize>,

    /// Retained page count per sniffed file type
    pub pages_by_type: HashMap<String, usize>,

    /// Deepest level any retained page was found at
    pub max_depth_seen: u32,
}

/// Builds a [`CrawlSummary`] from a merged record list
pub fn summarize_records(records: &[PageRecord]) -> CrawlSummary {
    let mut summary = CrawlSummary {
        total_pages: records.len(),
        ..CrawlSummary::default()
    };

    for record in records {
        *summary
            .pages_by_site
            .entry(record.site_name.clone())
            .or_insert(0) += 1;
        *summary
            .pages_by_type
            .entry(record.file_type.clone())
            .or_insert(0) += 1;
        summary.max_depth_seen = summary.max_depth_seen.max(record.page_depth);
    }

    summary
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");
    println!("Total pages: {}", summary.total_pages);
    println!("Deepest level: {}", summary.max_depth_seen);
    println!();

    println!("Pages by Site:");
    let mut site_counts: Vec<_> = summary.pages_by_site.iter().collect();
    site_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (site, count) in site_counts {
        println!("  {}: {}", site, count);
    }
    println!();

    println!("Pages by File Type:");
    let mut type_counts: Vec<_> = summary.pages_by_type.iter().collect();
    type_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (file_type, count) in type_counts {
        println!("  {}: {}", file_type, count);
    }
}
