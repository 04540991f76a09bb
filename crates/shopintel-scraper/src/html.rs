//! Regex-based HTML helpers shared by the page extractors.
//!
//! Storefront themes vary too much for selector-exact parsing to pay off;
//! these helpers pull text, links, and JSON-LD out of raw markup tolerantly.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static NOISE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "noscript", "svg", "template"]
        .iter()
        .map(|el| Regex::new(&format!(r"(?is)<{el}\b.*?</{el}\s*>")).expect("valid regex"))
        .collect()
});
static CHROME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["nav", "header", "footer"]
        .iter()
        .map(|el| Regex::new(&format!(r"(?is)<{el}\b.*?</{el}\s*>")).expect("valid regex"))
        .collect()
});
static MAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main\b[^>]*>(.*?)</main\s*>").expect("valid regex"));
static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<article\b[^>]*>(.*?)</article\s*>").expect("valid regex")
});
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)</body\s*>").expect("valid regex"));
static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});
static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("valid regex"));
static HREF_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bhref\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});
static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static META_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\b(?:name|property|itemprop)\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});
static META_CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bcontent\s*=\s*["']([^"']*)["']"#).expect("valid regex")
});
static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});
static BLOCK_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|h[1-6]|tr)\s*>").expect("valid regex")
});
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x?)([0-9a-fA-F]+);").expect("valid regex"));

/// Strips tags, decodes common entities, and collapses whitespace.
#[must_use]
pub fn clean_text(input: &str) -> String {
    let spaced = BLOCK_BREAK_RE.replace_all(input, " ");
    let no_tags = TAG_RE.replace_all(&spaced, " ");
    decode_entities(&no_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[must_use]
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }
    let numeric = NUMERIC_ENTITY_RE.replace_all(input, |caps: &regex::Captures<'_>| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| caps[0].to_owned(), String::from)
    });
    numeric
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&ndash;", "\u{2013}")
        .replace("&mdash;", "\u{2014}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Removes scripts, styles, and other non-content blocks.
#[must_use]
pub fn strip_noise(html: &str) -> String {
    let mut out = COMMENT_RE.replace_all(html, " ").into_owned();
    for re in NOISE_RES.iter() {
        out = re.replace_all(&out, " ").into_owned();
    }
    out
}

/// All visible text on the page, site chrome included.
#[must_use]
pub fn page_text(html: &str) -> String {
    clean_text(&strip_noise(html))
}

/// Text of the page's primary content region.
///
/// Prefers `<main>`, then `<article>`, then `<body>`, after dropping
/// navigation, header, and footer blocks.
#[must_use]
pub fn main_text(html: &str) -> String {
    let mut stripped = strip_noise(html);
    for re in CHROME_RES.iter() {
        stripped = re.replace_all(&stripped, " ").into_owned();
    }
    let region = [&*MAIN_RE, &*ARTICLE_RE, &*BODY_RE]
        .iter()
        .find_map(|re| re.captures(&stripped).and_then(|c| c.get(1)))
        .map_or(stripped.as_str(), |m| m.as_str());
    clean_text(region)
}

/// `href` values of every anchor, entity-decoded and trimmed.
#[must_use]
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .collect()
}

/// An anchor's `href` together with its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Every anchor with an `href`, in document order.
#[must_use]
pub fn anchors(html: &str) -> Vec<Anchor> {
    ANCHOR_RE
        .captures_iter(html)
        .filter_map(|cap| {
            let attrs = cap.get(1)?.as_str();
            let href = HREF_ATTR_RE.captures(attrs)?.get(1)?.as_str();
            let href = decode_entities(href.trim());
            if href.is_empty() || href.starts_with('#') {
                return None;
            }
            let text = cap.get(2).map(|m| clean_text(m.as_str())).unwrap_or_default();
            Some(Anchor { href, text })
        })
        .collect()
}

/// `content` of the first `<meta>` whose `name`, `property` or `itemprop`
/// equals `key` (case-insensitive).
#[must_use]
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    META_RE.find_iter(html).find_map(|tag| {
        let tag = tag.as_str();
        let name = META_KEY_RE.captures(tag)?.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(key) {
            return None;
        }
        let content = META_CONTENT_RE.captures(tag)?.get(1)?.as_str().trim();
        (!content.is_empty()).then(|| decode_entities(content))
    })
}

/// Parsed `application/ld+json` blocks. Blocks that fail to parse are skipped.
#[must_use]
pub fn json_ld_blocks(html: &str) -> Vec<Value> {
    JSON_LD_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| {
            let raw = m.as_str().trim();
            if raw.is_empty() {
                return None;
            }
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed JSON-LD block");
                    None
                }
            }
        })
        .collect()
}

/// First `max` characters of `text`, on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_owned(),
        None => text.to_owned(),
    }
}
