//! Block-scoring article extraction
//!
//! The extractor splits a page into blocks on structural tag boundaries and
//! scores each block by how much prose it holds once links and forms are
//! removed. Navigation blocks die on the link-density checks, boilerplate
//! dies on the waste expression, and whatever survives is the article body.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

use crate::extract::text::{extract_title, strip_tags};

static FRAMESET_OR_REDIRECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)</frameset>|<meta\s+http-equiv\s*=\s*["']?refresh["']?[^>]*url"#).unwrap()
});
static HEAD_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

static AD_IGNORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<!--\s*google_ad_section_start\(weight=ignore\)\s*-->.*?<!--\s*google_ad_section_end.*?-->",
    )
    .unwrap()
});
static AD_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<!--\s*google_ad_section_start[^>]*-->").unwrap());
static AD_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--\s*google_ad_section_start[^>]*-->.*?<!--\s*google_ad_section_end.*?-->")
        .unwrap()
});

static USELESS_SYMBOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{2018}-\u{201d}\u{2190}-\u{2193}\u{25a0}-\u{25bd}\u{25c6}-\u{25ef}\u{2605}-\u{2606}]")
        .unwrap()
});
static SCRIPT_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<script[^>]*>.*?</script\s*>|<style[^>]*>.*?</style\s*>|<select[^>]*>.*?</select\s*>|<noscript[^>]*>.*?</noscript\s*>",
    )
    .unwrap()
});
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<![A-Za-z].*?>").unwrap());
static SLIDE_CONTAINER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div\s[^>]*class\s*=\s*['"]?alpslab-slide["']?[^>]*>.*?</div\s*>"#).unwrap()
});
static MORE_DIV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<div\s[^>]*(?:id|class)\s*=\s*['"]?\S*more\S*["']?[^>]*>"#).unwrap()
});

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<h\d\s*>\s*(.*?)\s*</h\d\s*>").unwrap());

static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"</?(?:div|center|td)[^>]*>|<p\s*[^>]*class\s*=\s*["']?(?:posted|plugin-\w+)["']?[^>]*>"#)
        .unwrap()
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<a\s[^>]*>.*?</a\s*>").unwrap());
static FORM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<form\s[^>]*>.*?</form\s*>").unwrap());

static LIST_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:ul|dl|ol)(.+?)</(?:ul|dl|ol)>").unwrap());
static OUTSIDE_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:ul|dl)(.+?)</(?:ul|dl)>").unwrap());
static TAG_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<.+?>").unwrap());
static ALL_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"<li[^>]*>").unwrap());
static LIST_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\s+href=(?:"[^"'\s]+"|'[^"'\s]+'|[^"'\s]+)"#).unwrap()
});

static PUNCTUATIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)([\u{3001}\u{3002}\u{ff01}\u{ff0c}\u{ff0e}\u{ff1f}]|\.[^A-Za-z0-9]|,[^0-9]|!|\?)")
        .unwrap()
});
static WASTE_EXPRESSIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)All Rights Reserved").unwrap());

/// Tuning knobs for the block scorer
///
/// The defaults are the values the whole pipeline was calibrated with;
/// change them only with a labeled evaluation set at hand.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Minimum score an evaluated block needs to be accepted
    pub threshold: f64,
    /// Minimum not-linked length (in characters) for a block to be scored
    pub min_length: usize,
    /// Multiplied into the running decay after every evaluated block
    pub decay_factor: f64,
    /// Continuous-bonus reset value after an accepted block
    pub continuous_factor: f64,
    /// Score contribution of each punctuation hit
    pub punctuation_weight: f64,
    /// Sentence-ending punctuation
    pub punctuations: Regex,
    /// Boilerplate pattern rejecting a block outright
    pub waste_expressions: Regex,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            min_length: 80,
            decay_factor: 0.73,
            continuous_factor: 1.62,
            punctuation_weight: 10.0,
            punctuations: PUNCTUATIONS.clone(),
            waste_expressions: WASTE_EXPRESSIONS.clone(),
        }
    }
}

/// Extracts the article body and title from an HTML document
///
/// Pure and deterministic: identical input yields identical output. The
/// body comes back as the accepted blocks' plain text in document order;
/// framesets and meta-refresh redirects yield no body at all.
///
/// # Arguments
///
/// * `html` - The decoded HTML document
///
/// # Returns
///
/// The ordered body segments and the document title, either possibly empty.
pub fn extract(html: &str) -> (Vec<String>, String) {
    extract_with_options(html, &ExtractOptions::default())
}

/// [`extract`] with explicit tuning knobs
pub fn extract_with_options(html: &str, options: &ExtractOptions) -> (Vec<String>, String) {
    if FRAMESET_OR_REDIRECT.is_match(html) {
        return (Vec::new(), extract_title(html));
    }

    // Title lives before </head>; scoring works on what follows it
    let (title, mut body) = match HEAD_END.find(html) {
        Some(head_end) => (
            extract_title(&html[..head_end.start()]),
            html[head_end.end()..].to_string(),
        ),
        None => (extract_title(html), html.to_string()),
    };

    body = AD_IGNORE.replace_all(&body, "").into_owned();
    if AD_START.is_match(&body) {
        // Ad-annotated regions, when present, are assumed to hold the
        // entire article
        let sections: Vec<&str> = AD_SECTION.find_iter(&body).map(|m| m.as_str()).collect();
        body = sections.join("\n");
    }

    body = eliminate_useless_tags(&body);
    body = demote_title_headings(&body, &title);

    let mut decay = 1.0_f64;
    let mut continuous = 1.0_f64;
    let mut accepted: Vec<String> = Vec::new();

    for block in BLOCK_BOUNDARY.split(&body) {
        if has_only_tags(block) {
            continue;
        }

        let not_linked = not_linked_text(block);
        let length = not_linked.chars().count();
        if length < options.min_length {
            continue;
        }

        let punctuation = options.punctuations.find_iter(&not_linked).count();
        let score = (length as f64 + punctuation as f64 * options.punctuation_weight) * decay;
        decay *= options.decay_factor;

        if options.waste_expressions.is_match(&not_linked) {
            continue;
        }

        // Secondary score; acceptance never reads it
        let continuous_score = score * continuous;
        trace!(score, continuous_score, length, "Scored text block");

        if score >= options.threshold {
            accepted.push(not_linked);
            continuous = options.continuous_factor;
        }
    }

    let segments = accepted
        .iter()
        .map(|segment| strip_tags(segment, true))
        .collect();
    (segments, title)
}

fn eliminate_useless_tags(html: &str) -> String {
    let html = USELESS_SYMBOLS.replace_all(html, "");
    let html = SCRIPT_LIKE.replace_all(&html, "");
    let html = COMMENT.replace_all(&html, "");
    let html = DECLARATION.replace_all(&html, "");
    let html = SLIDE_CONTAINER.replace_all(&html, "");
    MORE_DIV.replace_all(&html, "").into_owned()
}

/// Rewrites attribute-less headings that repeat the title into plain `<div>`
/// wrappers, so they split off as their own (short, discardable) blocks
/// instead of inflating a body block
fn demote_title_headings(html: &str, title: &str) -> String {
    HEADING
        .replace_all(html, |caps: &Captures<'_>| {
            let stripped = strip_tags(caps.get(1).map_or("", |m| m.as_str()), true);
            if stripped.chars().count() >= 3 && title.contains(&stripped) {
                format!("<div>{}</div>", stripped)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// True when a block holds no text outside markup
fn has_only_tags(block: &str) -> bool {
    let text = ANY_TAG.replace_all(block, "");
    let text = text.replace("&nbsp;", "");
    text.trim().is_empty()
}

/// A block's text with anchor and form contents removed
///
/// Returns an empty string for navigation blocks: ones whose remaining text
/// is shorter than 20 characters per removed anchor, and ones judged to be
/// link lists.
fn not_linked_text(block: &str) -> String {
    let anchor_count = ANCHOR.find_iter(block).count();
    let text = ANCHOR.replace_all(block, "");
    let text = FORM.replace_all(&text, "");
    let text = strip_tags(&text, true);

    if text.chars().count() < 20 * anchor_count || is_link_list(block) {
        return String::new();
    }
    text
}

/// Link-list judgment over a block's first `<ul>`/`<ol>`/`<dl>` group
///
/// The denser the list's items are with hrefs, the more surrounding text is
/// required for the block to survive.
fn is_link_list(block: &str) -> bool {
    let Some(caps) = LIST_BLOCK.captures(block) else {
        return false;
    };
    let list_part = caps.get(1).map_or("", |m| m.as_str());

    // ol groups are measured but never removed from the outside text
    let outside = OUTSIDE_LIST.replace_all(block, "");
    let outside = TAG_SPAN.replace_all(&outside, "");
    let outside = ALL_WHITESPACE.replace_all(&outside, "");

    let items: Vec<&str> = LIST_ITEM.split(list_part).collect();
    let rate = evaluate_list_density(&items);

    let outside_len = outside.chars().count() as f64;
    let block_len = block.chars().count() as f64;
    outside_len <= block_len / (45.0 / rate)
}

/// Href density of a list's items, mapped to a 1..=10 weighting
fn evaluate_list_density(items: &[&str]) -> f64 {
    if items.is_empty() {
        return 1.0;
    }
    let hits = items.iter().filter(|item| LIST_HREF.is_match(item)).count();
    let ratio = hits as f64 / items.len() as f64;
    9.0 * ratio * ratio + 1.0
}
