//! Regex-level HTML cleanup shared by the extractor and the snapshot builder.
//!
//! Patterns work on raw markup and stop at the first matching close tag, so
//! nested elements of the same name are cut short. The `regex` crate has no
//! look-around; URL exclusions are checked inside the replacement closures.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::text::absolutize_url;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").unwrap());
static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style>").unwrap());
static NOSCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<noscript\b.*?</noscript>").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static HANDLER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)\s+on\w+="[^"]*""#).unwrap());
static DATA_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+data-[a-z-]+="[^"]*""#).unwrap());
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());
static BODY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").unwrap());

static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(<img[^>]*\s)src=["']([^"']+)["']"#).unwrap());
static ANCHOR_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(<a\b[^>]*\s)href=["']([^"']+)["']"#).unwrap());
static SRCSET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)srcset=["']([^"']+)["']"#).unwrap());

/// Class fragments marking ads, social widgets and other page chrome.
pub const CLUTTER_CLASSES: &[&str] = &[
    "ad-",
    "ads-",
    "advert",
    "social",
    "share",
    "comment",
    "related",
    "newsletter",
    "subscribe",
    "popup",
    "modal",
    "cookie",
    "sidebar",
];

/// Matches a whole `<tag …>…</tag>` element (or just `<tag …>` when `void`).
pub fn element_pattern(tag: &str, void: bool) -> Regex {
    let tag = regex::escape(tag);
    let pattern = if void {
        format!(r"(?i)<{tag}\b[^>]*>")
    } else {
        format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}>")
    };
    Regex::new(&pattern).unwrap()
}

/// Matches a whole `<tag class="…">…</tag>` element whose class contains any fragment.
pub fn class_pattern(tag: &str, fragments: &[&str]) -> Regex {
    let tag = regex::escape(tag);
    let alternatives = fragments
        .iter()
        .map(|f| regex::escape(f))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r#"(?is)<{tag}[^>]*class="[^"]*(?:{alternatives})[^"]*"[^>]*>.*?</{tag}>"#
    ))
    .unwrap()
}

/// Drop `<script>`, `<noscript>` and comments.
pub fn strip_scripts(html: &str) -> String {
    let html = SCRIPT_RE.replace_all(html, "");
    let html = NOSCRIPT_RE.replace_all(&html, "");
    COMMENT_RE.replace_all(&html, "").into_owned()
}

pub fn strip_styles(html: &str) -> String {
    STYLE_RE.replace_all(html, "").into_owned()
}

/// Drop inline `on*="…"` handlers.
pub fn strip_event_handlers(html: &str) -> String {
    HANDLER_RE.replace_all(html, "").into_owned()
}

pub fn strip_data_attributes(html: &str) -> String {
    DATA_ATTR_RE.replace_all(html, "").into_owned()
}

pub fn collapse_blank_lines(html: &str) -> String {
    BLANK_LINES_RE.replace_all(html, "\n\n").into_owned()
}

pub fn remove_all(html: &str, patterns: &[Regex]) -> String {
    patterns
        .iter()
        .fold(html.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
}

/// Inner markup of the first `<body>` element.
pub fn body_inner(html: &str) -> Option<&str> {
    BODY_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn is_absolute_or_inline(url: &str) -> bool {
    ["http://", "https://", "//", "data:"]
        .iter()
        .any(|prefix| starts_with_ignore_case(url, prefix))
}

fn is_local_target(href: &str) -> bool {
    href.starts_with('#')
        || ["mailto:", "tel:", "javascript:"]
            .iter()
            .any(|prefix| starts_with_ignore_case(href, prefix))
}

/// Rewrite relative `<img src>`, `<a href>` and `srcset` URLs against `base_url`.
///
/// Rewritten anchors open in a new browsing context. Fragment, `mailto:`,
/// `tel:`, `javascript:` and absolute hrefs are left byte-for-byte unchanged.
pub fn fix_urls(html: &str, base_url: &str) -> String {
    let fixed = IMG_SRC_RE.replace_all(html, |caps: &Captures| {
        let url = &caps[2];
        if is_absolute_or_inline(url) {
            caps[0].to_string()
        } else {
            format!("{}src=\"{}\"", &caps[1], absolutize_url(url, base_url))
        }
    });

    let fixed = ANCHOR_HREF_RE.replace_all(&fixed, |caps: &Captures| {
        let href = &caps[2];
        if is_absolute_or_inline(href) || is_local_target(href) {
            caps[0].to_string()
        } else {
            format!(
                "{}href=\"{}\" target=\"_blank\" rel=\"noopener\"",
                &caps[1],
                absolutize_url(href, base_url)
            )
        }
    });

    SRCSET_RE
        .replace_all(&fixed, |caps: &Captures| {
            let srcset = caps[1]
                .split(',')
                .map(|candidate| {
                    let mut parts: Vec<String> =
                        candidate.split_whitespace().map(str::to_string).collect();
                    if let Some(url) = parts.first_mut() {
                        if !url.starts_with("http") && !url.starts_with("data:") {
                            *url = absolutize_url(url, base_url);
                        }
                    }
                    parts.join(" ")
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("srcset=\"{srcset}\"")
        })
        .into_owned()
}
