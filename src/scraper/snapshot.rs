//! Self-contained HTML snapshots for sandboxed offline reading.
//!
//! The snapshot keeps the page's own look: inline `<style>` blocks and up to
//! `max_stylesheets` linked sheets are inlined into one `<style>` element,
//! with `url(...)` references rebased onto each sheet's own location.

use std::sync::LazyLock;

use futures::future::join_all;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::fetcher::Fetcher;
use crate::scraper::html::{
    body_inner, class_pattern, element_pattern, fix_urls, remove_all, strip_event_handlers,
    strip_scripts, CLUTTER_CLASSES,
};
use crate::text::{absolutize_url, tag_attributes};

static INLINE_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").unwrap());
static LINK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").unwrap());
static CSS_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\(['"]?([^'")]+)['"]?\)"#).unwrap());

static SNAPSHOT_NOISE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let mut patterns: Vec<Regex> = ["nav", "footer", "aside", "form", "button"]
        .iter()
        .map(|tag| element_pattern(tag, false))
        .collect();
    patterns.push(element_pattern("input", true));
    patterns.push(element_pattern("iframe", false));
    patterns.push(class_pattern("div", CLUTTER_CLASSES));
    patterns.push(element_pattern("ins", false));
    patterns.push(element_pattern("amp-ad", false));
    patterns
});

const RESET_CSS: &str = r#"    /* Reset some styles for better display */
    body {
      margin: 0;
      padding: 20px;
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
    }
    img {
      max-width: 100%;
      height: auto;
    }
    a {
      color: inherit;
    }"#;

/// Stylesheets referenced by a page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageStyles {
    /// Text of every inline `<style>` block, in document order
    pub inline: Vec<String>,
    /// Absolute URLs of linked stylesheets, deduplicated, first-seen order
    pub linked: Vec<String>,
}

/// Collect inline CSS and linked stylesheet URLs from `html`.
///
/// `rel="stylesheet"` may appear before or after `href`.
pub fn collect_stylesheets(html: &str, base_url: &str) -> PageStyles {
    let inline = INLINE_STYLE_RE
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect();

    let mut linked: Vec<String> = Vec::new();
    for tag in LINK_TAG_RE.find_iter(html) {
        let attrs = tag_attributes(tag.as_str());
        let is_stylesheet = attrs
            .get("rel")
            .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"));
        let Some(href) = attrs.get("href").filter(|_| is_stylesheet) else {
            continue;
        };

        let url = absolutize_url(href, base_url);
        if !linked.contains(&url) {
            linked.push(url);
        }
    }

    PageStyles { inline, linked }
}

/// Rewrite relative `url(...)` references against the stylesheet's own URL.
pub fn fix_css_urls(css: &str, css_url: &str) -> String {
    let css_base = match css_url.rfind('/') {
        Some(idx) => &css_url[..=idx],
        None => css_url,
    };

    CSS_URL_RE
        .replace_all(css, |caps: &Captures| {
            let url = &caps[1];
            let lower = url.to_ascii_lowercase();
            if lower.starts_with("data:")
                || lower.starts_with("http://")
                || lower.starts_with("https://")
                || url.starts_with("//")
            {
                caps[0].to_string()
            } else {
                format!("url('{}')", absolutize_url(url, css_base))
            }
        })
        .into_owned()
}

async fn fetch_stylesheet(fetcher: &(dyn Fetcher + Send + Sync), css_url: &str) -> Option<String> {
    match fetcher.fetch_text(css_url).await {
        Ok(css) => {
            debug!(url = %css_url, bytes = css.len(), "Fetched stylesheet");
            Some(fix_css_urls(&css, css_url))
        }
        Err(e) => {
            warn!(url = %css_url, error = %e, "Failed to fetch stylesheet");
            None
        }
    }
}

/// Body markup for the snapshot: chrome, scripts and handlers removed, URLs absolute.
pub fn clean_snapshot_body(html: &str, base_url: &str) -> String {
    let cleaned = remove_all(&strip_scripts(html), &SNAPSHOT_NOISE_RES);
    let cleaned = fix_urls(&strip_event_handlers(&cleaned), base_url);

    match body_inner(&cleaned) {
        Some(body) => body.to_string(),
        None => cleaned,
    }
}

/// Build one self-contained HTML document from a fetched page.
///
/// At most `max_stylesheets` distinct linked sheets are fetched, concurrently.
/// A sheet that fails to load is logged and left out. CSS is emitted inline
/// blocks first, then fetched sheets in document order.
pub async fn build_styled_html(
    fetcher: &(dyn Fetcher + Send + Sync),
    html: &str,
    base_url: &str,
    max_stylesheets: usize,
) -> String {
    let styles = collect_stylesheets(html, base_url);

    let fetched = join_all(
        styles
            .linked
            .iter()
            .take(max_stylesheets)
            .map(|css_url| fetch_stylesheet(fetcher, css_url)),
    )
    .await;

    let all_css = styles
        .inline
        .into_iter()
        .chain(fetched.into_iter().flatten())
        .collect::<Vec<_>>()
        .join("\n");

    let body = clean_snapshot_body(html, base_url);
    let base_href = html_escape::encode_double_quoted_attribute(base_url.trim_end_matches('/'));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <base href="{base_href}/">
  <style>
{RESET_CSS}
    /* Inlined CSS from original site */
    {all_css}
  </style>
</head>
<body>
  {body}
</body>
</html>"#
    )
}
