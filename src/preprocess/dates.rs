//! Publish-date estimation from page markup
//!
//! Two sources, in priority order: `datePublished` inside
//! `application/ld+json` script blocks, then the
//! `article:published_time` meta property. A candidate only counts when
//! it parses as a real calendar date.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static LD_JSON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

static PUBLISHED_META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="article:published_time"]"#).unwrap());

static LD_JSON_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""datePublished":\s*?"(\d{4}-\d{2}-\d{2})"#).unwrap());

static ANY_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());

/// Estimates the publish date of a page as `YYYY-MM-DD`
///
/// Returns `None` when neither markup source yields a date that survives
/// calendar validation.
pub fn estimate_publish_date(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(date) = date_from_ld_json(&document) {
        return Some(date);
    }
    date_from_published_meta(&document)
}

fn date_from_ld_json(document: &Html) -> Option<String> {
    let scripts: Vec<String> = document
        .select(&LD_JSON_SELECTOR)
        .map(|element| element.text().collect::<String>())
        .collect();
    if scripts.is_empty() {
        return None;
    }
    captured_date(&LD_JSON_DATE, &scripts.join("\n"))
}

fn date_from_published_meta(document: &Html) -> Option<String> {
    let contents: Vec<&str> = document
        .select(&PUBLISHED_META_SELECTOR)
        .filter_map(|element| element.value().attr("content"))
        .collect();
    if contents.is_empty() {
        return None;
    }
    captured_date(&ANY_DATE, &contents.join("\n"))
}

/// First match of `pattern` in `text`, kept only when it is a valid date
fn captured_date(pattern: &Regex, text: &str) -> Option<String> {
    let date = pattern.captures(text)?.get(1)?.as_str();
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some(date.to_string())
}
