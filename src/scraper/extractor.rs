use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::domain::ExtractedArticle;
use crate::fetcher::Fetcher;
use crate::scraper::html::{
    body_inner, class_pattern, collapse_blank_lines, element_pattern, fix_urls, remove_all,
    strip_data_attributes, strip_event_handlers, strip_scripts, strip_styles, CLUTTER_CLASSES,
};
use crate::scraper::snapshot::build_styled_html;
use crate::scraper::ScraperConfig;
use crate::text::{absolutize_url, decode_entities, tag_attributes};

static META_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").unwrap());
static TITLE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[|\-–—]\s*").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h1[^>]*>([^<]+)</h1>").unwrap());
static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| element_pattern("article", false));

/// Containers commonly wrapping an article body, tried after `<article>`.
static CONTAINER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        class_pattern(
            "div",
            &[
                "article-body",
                "article-content",
                "post-content",
                "entry-content",
                "content-body",
                "story-body",
                "post-body",
                "article__body",
                "article__content",
                "main-content",
            ],
        ),
        Regex::new(
            r#"(?is)<div[^>]*id="[^"]*(?:article-body|article-content|post-content|content)[^"]*"[^>]*>.*?</div>"#,
        )
        .unwrap(),
        element_pattern("main", false),
    ]
});

/// Page chrome removed from the chosen readable block.
static ARTICLE_NOISE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let mut patterns: Vec<Regex> = [
        "nav", "header", "footer", "aside", "form", "button", "select", "iframe", "svg",
    ]
    .iter()
    .map(|tag| element_pattern(tag, false))
    .collect();
    patterns.push(element_pattern("input", true));
    patterns.push(class_pattern("div", CLUTTER_CLASSES));
    patterns.push(class_pattern("section", &["comment", "related", "newsletter"]));
    patterns.push(element_pattern("ins", false));
    patterns.push(element_pattern("amp-ad", false));
    patterns
});

/// Attributes of every `<meta>` tag, in document order, keys lowercased.
fn meta_tags(html: &str) -> Vec<HashMap<String, String>> {
    META_TAG_RE
        .find_iter(html)
        .map(|tag| tag_attributes(tag.as_str()))
        .collect()
}

/// Non-empty `content` of the first `<meta property|name="key">`.
fn meta_content(html: &str, key: &str) -> Option<String> {
    meta_tags(html).into_iter().find_map(|attrs| {
        let matches = ["property", "name"]
            .iter()
            .any(|attr| attrs.get(*attr).is_some_and(|v| v.eq_ignore_ascii_case(key)));
        if !matches {
            return None;
        }
        attrs.get("content").filter(|c| !c.is_empty()).cloned()
    })
}

/// `og:title` → `twitter:title` → `<title>` minus its site suffix → first `<h1>` → `""`.
pub fn extract_title(html: &str) -> String {
    if let Some(title) = meta_content(html, "og:title").or_else(|| meta_content(html, "twitter:title")) {
        return decode_entities(&title);
    }

    if let Some(caps) = TITLE_RE.captures(html) {
        let title = decode_entities(&caps[1]);
        let head = TITLE_SUFFIX_RE.split(&title).next().unwrap_or_default();
        return head.trim().to_string();
    }

    H1_RE
        .captures(html)
        .map(|caps| decode_entities(&caps[1]))
        .unwrap_or_default()
}

/// `og:site_name` → host of `base_url` without `www.` → `""`.
pub fn extract_site_name(html: &str, base_url: &str) -> String {
    if let Some(site) = meta_content(html, "og:site_name") {
        return decode_entities(&site);
    }

    url::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.strip_prefix("www.").unwrap_or(h).to_string()))
        .unwrap_or_default()
}

/// `og:image` → `twitter:image`, absolutized against `base_url`.
pub fn extract_hero_image(html: &str, base_url: &str) -> Option<String> {
    meta_content(html, "og:image")
        .or_else(|| meta_content(html, "twitter:image"))
        .map(|image| absolutize_url(&decode_entities(&image), base_url))
}

/// `og:description` → `<meta name="description">` → `""`.
pub fn extract_excerpt(html: &str) -> String {
    meta_content(html, "og:description")
        .or_else(|| meta_content(html, "description"))
        .map(|excerpt| decode_entities(&excerpt))
        .unwrap_or_default()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Pick the block most likely to hold the article text.
///
/// Candidates, each tried only while the current one is shorter than
/// `min_len` characters: the first `<article>`, the longest known content
/// container or `<main>`, then the whole `<body>`.
pub fn readable_block(html: &str, min_len: usize) -> String {
    let working = strip_event_handlers(&strip_styles(&strip_scripts(html)));

    let mut content = ARTICLE_RE
        .find(&working)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    if char_len(&content) < min_len {
        for re in CONTAINER_RES.iter() {
            for candidate in re.find_iter(&working) {
                if char_len(candidate.as_str()) > char_len(&content) {
                    content = candidate.as_str().to_string();
                }
            }
        }
    }

    if char_len(&content) < min_len {
        if let Some(body) = body_inner(&working) {
            content = body.to_string();
        }
    }

    content
}

/// Strip page chrome and tracking attributes, then rebase URLs.
pub fn clean_article_content(html: &str, base_url: &str) -> String {
    let content = remove_all(html, &ARTICLE_NOISE_RES);
    let content = strip_data_attributes(&strip_event_handlers(&content));
    let content = fix_urls(&content, base_url);
    collapse_blank_lines(&content).trim().to_string()
}

/// Content extractor turning a fetched article page into an [`ExtractedArticle`]
pub struct ContentExtractor {
    config: ScraperConfig,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl ContentExtractor {
    pub fn new(config: ScraperConfig, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self { config, fetcher }
    }

    /// Extract metadata, a readable block and an offline snapshot from `html`.
    ///
    /// Never fails: missing pieces come back empty. Linked stylesheets are
    /// fetched for the snapshot; the page itself is not.
    pub async fn extract(&self, html: &str, base_url: &str) -> ExtractedArticle {
        let styled_html = build_styled_html(
            self.fetcher.as_ref(),
            html,
            base_url,
            self.config.max_stylesheets,
        )
        .await;

        let content = readable_block(html, self.config.min_content_length);

        ExtractedArticle {
            title: extract_title(html),
            content: clean_article_content(&content, base_url),
            excerpt: extract_excerpt(html),
            site_name: extract_site_name(html, base_url),
            hero_image: extract_hero_image(html, base_url),
            styled_html,
        }
    }
}
