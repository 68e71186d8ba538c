//! Tag stripping and text cleanup shared across the extractor

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.+?>").unwrap());
static KEISEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{2500}-\u{257f}]").unwrap());
static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(.*?);").unwrap());
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*").unwrap());
static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<title[^>]*>\s*(.*?)\s*</title\s*>").unwrap());

/// The small fixed entity table; anything outside it stays literal
fn entity_replacement(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some(" "),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "laquo" => Some("\u{ab}"),
        "raquo" => Some("\u{bb}"),
        _ => None,
    }
}

/// Strips markup from an HTML fragment
///
/// Removes tags, box-drawing characters and a handful of entity references,
/// then (when `collapse_whitespace` is set) squeezes space/tab runs to one
/// space and newline runs to one newline.
pub fn strip_tags(html: &str, collapse_whitespace: bool) -> String {
    let text = TAG.replace_all(html, "");
    let text = KEISEN.replace_all(&text, "");
    let text = ENTITY.replace_all(&text, |caps: &regex::Captures<'_>| {
        match entity_replacement(&caps[1]) {
            Some(replacement) => replacement.to_string(),
            None => caps[0].to_string(),
        }
    });

    if !collapse_whitespace {
        return text.into_owned();
    }

    let text = SPACE_RUN.replace_all(&text, " ");
    NEWLINE_RUN.replace_all(&text, "\n").into_owned()
}

/// Extracts the document title from the first `<title>` pair
///
/// Inner tags are stripped and entities decoded; a missing title yields an
/// empty string.
pub fn extract_title(html: &str) -> String {
    match TITLE.captures(html) {
        Some(caps) => strip_tags(caps.get(1).map_or("", |m| m.as_str()), false),
        None => String::new(),
    }
}
