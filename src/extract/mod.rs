//! Heuristic article-body extraction
//!
//! Splits decoded HTML into blocks, scores each block on prose density
//! against link density, and returns the accepted blocks' plain text plus
//! the document title. No site-specific selectors anywhere; the same
//! scoring handles every site.

mod extractor;
mod text;

pub use extractor::{extract, extract_with_options, ExtractOptions};
pub use text::{extract_title, strip_tags};
