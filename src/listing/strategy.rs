//! Per-site listing strategies
//!
//! A closed table: a site either has an entry here or the listing crawl
//! skips it. No dynamic registration.

/// How one site's published articles are enumerated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStrategy {
    /// Fetch sitemap indexes, then every article sitemap they point to,
    /// collecting `<loc>` URLs under the site's own prefix
    SitemapXml {
        sitemap_urls: &'static [&'static str],
    },

    /// Walk a page-numbered archive, scraping article anchors with a CSS
    /// selector; `{page}` in the template is replaced by the page number
    PagedListing {
        url_template: &'static str,
        pages: u32,
        selector: &'static str,
    },
}

/// Looks up the listing strategy registered for a site name
///
/// Returns `None` for sites without an entry; the listing crawl logs and
/// skips those. Names match the `[[site]]` config entries exactly.
pub fn strategy_for_site(name: &str) -> Option<ListingStrategy> {
    match name {
        "CNN" => Some(ListingStrategy::SitemapXml {
            sitemap_urls: &[
                "https://www.cnn.com/sitemap/article.xml",
                "https://www.cnn.com/sitemap/video.xml",
                "https://www.cnn.com/sitemap/gallery.xml",
            ],
        }),
        "Variety" => Some(ListingStrategy::SitemapXml {
            sitemap_urls: &["https://variety.com/sitemap_index.xml"],
        }),
        "TechCrunch" => Some(ListingStrategy::PagedListing {
            url_template: "https://techcrunch.com/latest/page/{page}/",
            pages: 13380,
            selector: "a.loop-card__title-link",
        }),
        "Mongabay" => Some(ListingStrategy::PagedListing {
            url_template: "https://news.mongabay.com/list/2024/page/{page}/",
            pages: 790,
            selector: "#post-results a[href]",
        }),
        _ => None,
    }
}
