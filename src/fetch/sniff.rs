//! File-type sniffing from byte content
//!
//! The crawler never trusts URL extensions or Content-Type headers; the
//! stored body decides. Binary formats are recognized by their magic-number
//! signatures, text formats by the shape of their first kilobyte.

/// HTML tag probes; a document starting with one of these (case-insensitive,
/// after whitespace/BOM) is HTML
const HTML_PROBES: &[&str] = &[
    "<!doctype html",
    "<html",
    "<head",
    "<body",
    "<title",
    "<meta",
    "<script",
    "<style",
    "<iframe",
    "<h1",
    "<div",
    "<p",
    "<table",
    "<a",
    "<b",
    "<br",
    "<font",
];

/// Source patterns of script-only bodies (redirect shells and similar)
const JS_PROBES: &[&str] = &[
    "document.",
    "window.",
    "location.",
    "var ",
    "let ",
    "const ",
    "function ",
    "function(",
    "(function",
    "'use strict'",
    "\"use strict\"",
    "/*",
    "//",
];

/// Sniffs a file type from body bytes
///
/// Returns a bare subtype string: `html`, `javascript`, `xml`, `plain`,
/// `x-empty` for empty bodies, a magic-number subtype such as `pdf`, `png`
/// or `zip` for binary formats, and `octet-stream` when nothing matches.
pub fn sniff_file_type(body: &[u8]) -> String {
    if body.is_empty() {
        return "x-empty".to_string();
    }

    if let Some(kind) = infer::get(body) {
        // "application/pdf" -> "pdf", "image/jpeg" -> "jpeg"
        if let Some(subtype) = kind.mime_type().rsplit('/').next() {
            return subtype.to_string();
        }
    }

    sniff_text_type(body)
}

/// Classifies non-binary bodies by their leading content
fn sniff_text_type(body: &[u8]) -> String {
    let head = &body[..body.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    let lower = trimmed.to_lowercase();

    if lower.starts_with("<?xml") {
        return "xml".to_string();
    }

    if lower.starts_with("<!--") || HTML_PROBES.iter().any(|tag| starts_with_tag(&lower, tag)) {
        return "html".to_string();
    }

    if JS_PROBES.iter().any(|probe| lower.starts_with(probe)) {
        return "javascript".to_string();
    }

    if head.contains(&0) {
        "octet-stream".to_string()
    } else {
        "plain".to_string()
    }
}

/// True when `text` opens with `tag` as a complete tag name
///
/// `<b>` and `<body>` must match their own probes, so the probe has to be
/// terminated by whitespace, `>` or `/`.
fn starts_with_tag(text: &str, tag: &str) -> bool {
    match text.strip_prefix(tag) {
        Some(rest) => matches!(
            rest.chars().next(),
            Some(' ') | Some('>') | Some('\t') | Some('\n') | Some('\r') | Some('/')
        ),
        None => false,
    }
}
