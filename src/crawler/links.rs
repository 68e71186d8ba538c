//! Outbound link extraction
//!
//! Pulls anchor targets out of a fetched HTML page and normalizes them into
//! absolute, fragment-free URLs ready for the frontier.

use scraper::{Html, Selector};
use url::Url;

/// Extracts child links from an HTML page
///
/// Anchor `href` values are trimmed, resolved against the page URL when they
/// carry no scheme, restricted to `http`/`https`, and stripped of fragments.
/// The returned list is in document order and may contain duplicates; the
/// engine deduplicates against its visited set.
///
/// # Arguments
///
/// * `html` - The decoded page markup
/// * `page_url` - The page's own URL, base for relative links
pub fn extract_child_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(resolved) = resolve_child_link(href, page_url) {
                    links.push(resolved);
                }
            }
        }
    }

    links
}

/// Resolves one href into an absolute, fragment-free URL
///
/// Returns `None` for empty hrefs, non-web schemes (`javascript:`,
/// `mailto:`, `tel:`, `data:`, ...), and hrefs that fail to resolve.
/// The listing crawler shares this for the anchors it scrapes.
pub fn resolve_child_link(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut absolute = match Url::parse(href) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                parsed
            } else {
                return None;
            }
        }
        // No scheme: resolve against the page
        Err(url::ParseError::RelativeUrlWithoutBase) => page_url.join(href).ok()?,
        Err(_) => return None,
    };

    absolute.set_fragment(None);
    Some(absolute.to_string())
}
