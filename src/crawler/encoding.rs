//! Per-site encoding negotiation
//!
//! News sites rarely mix encodings, so the candidate list is sniffed once
//! from the first page and reused for the whole crawl. Candidate resolution
//! deliberately keeps the LAST candidate that decodes strictly, not the
//! first; see [`EncodingResolver::resolve`].

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// Outcome of decoding one page body
#[derive(Debug)]
pub struct DecodedPage {
    /// Decoded text; lossy UTF-8 when no encoding worked
    pub text: String,
    /// Name of the winning encoding, `None` for the lossy fallback
    pub encoding: Option<String>,
}

/// Candidate-list decoder owned by one traversal engine
#[derive(Debug, Default)]
pub struct EncodingResolver {
    candidates: Vec<&'static Encoding>,
}

impl EncodingResolver {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// The fixed candidate names, in trial order (for diagnostics)
    pub fn candidate_names(&self) -> Vec<&'static str> {
        self.candidates.iter().map(|e| e.name()).collect()
    }

    /// Decodes a page body
    ///
    /// On the first page of a crawl (depth 0) the candidate list is seeded:
    /// `[utf-8]` when the sniffed encoding is UTF-8, `[utf-8, sniffed]`
    /// otherwise, and it stays fixed afterwards. Every candidate is then
    /// tried in order and each strict success overwrites the previous one,
    /// so the last candidate that decodes wins. Many byte sequences decode
    /// under several encodings with different text; changing this to
    /// first-wins changes the output.
    ///
    /// When no candidate decodes, the encoding is sniffed from scratch for
    /// this page only; if even that fails the body is decoded lossily and
    /// the returned encoding is `None`.
    pub fn resolve(&mut self, body: &[u8], url: &str, depth: u32) -> DecodedPage {
        if depth == 0 {
            let sniffed = sniff_encoding(body);
            self.candidates = if sniffed == UTF_8 {
                vec![UTF_8]
            } else {
                vec![UTF_8, sniffed]
            };
            debug!(
                url,
                candidates = ?self.candidate_names(),
                "Seeded encoding candidates from first page"
            );
        }

        let mut resolved: Option<(String, &'static Encoding)> = None;
        for candidate in &self.candidates {
            if let Some(text) = strict_decode(candidate, body) {
                resolved = Some((text, candidate));
            }
        }

        if let Some((text, encoding)) = resolved {
            return DecodedPage {
                text,
                encoding: Some(encoding.name().to_string()),
            };
        }

        // The fixed candidates all failed; sniff this page on its own
        debug!(url, "Encoding candidates failed, re-sniffing");
        let sniffed = sniff_encoding(body);
        if let Some(text) = strict_decode(sniffed, body) {
            return DecodedPage {
                text,
                encoding: Some(sniffed.name().to_string()),
            };
        }

        warn!(url, "No encoding decodes this page, keeping lossy text");
        DecodedPage {
            text: String::from_utf8_lossy(body).into_owned(),
            encoding: None,
        }
    }
}

/// Strict decode: `None` on any malformed sequence
fn strict_decode(encoding: &'static Encoding, body: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
}

/// Sniffs the most plausible encoding from raw bytes
pub fn sniff_encoding(body: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    detector.guess(None, true)
}
