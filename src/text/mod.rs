//! Text and URL helpers shared by the normalizer and the scraper.
//!
//! Everything here is a pure function over untrusted input: nothing panics
//! and nothing returns an error. When a URL cannot be resolved the input is
//! handed back unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use url::Url;

/// Marker appended to summaries that were cut.
pub const ELLIPSIS: &str = "...";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src="([^">]+)""#).unwrap());
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*["']([^"']*)["']"#).unwrap()
});

/// Decode HTML entities in extracted text.
///
/// Handles decimal and hex character references and named entities.
/// `&nbsp;` becomes a plain space.
pub fn decode_entities(text: &str) -> String {
    decode_html_entities(text).replace('\u{a0}', " ")
}

/// Resolve `url` against `base`.
///
/// - `//host/x` gets an `https:` scheme
/// - `/x` resolves against the origin of `base`
/// - anything else not starting with `http` resolves against the full `base`
/// - `http…` passes through unchanged
pub fn absolutize_url(url: &str, base: &str) -> String {
    if url.starts_with("//") {
        return format!("https:{url}");
    }

    if url.starts_with("http") {
        return url.to_string();
    }

    Url::parse(base)
        .and_then(|base| base.join(url))
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// `scheme://host[:port]` of a URL, without a trailing slash.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.origin() {
        url::Origin::Tuple(..) => Some(parsed.origin().ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

/// Remove every `<…>` tag.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Strip tags, trim, and cut to `max_chars` characters with [`ELLIPSIS`].
///
/// Counts characters, not bytes.
pub fn shorten_text(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let clean = strip_tags(text);
    let clean = clean.trim();

    match clean.char_indices().nth(max_chars) {
        None => clean.to_string(),
        Some((cut, _)) => format!("{}{}", &clean[..cut], ELLIPSIS),
    }
}

/// URL slug for a title: lowercase ASCII alphanumerics joined by single hyphens.
///
/// Accents are stripped by decomposing and dropping combining diacritics;
/// any other character run becomes one hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{300}'..='\u{36f}').contains(c))
    {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// `src` of the first `<img>` in a chunk of HTML.
pub fn first_image_src(html: &str) -> Option<String> {
    IMG_SRC_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Quoted attributes of a single start tag, names lowercased.
pub fn tag_attributes(tag: &str) -> HashMap<String, String> {
    ATTR_RE
        .captures_iter(tag)
        .map(|caps| (caps[1].to_ascii_lowercase(), caps[2].to_string()))
        .collect()
}
