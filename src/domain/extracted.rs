use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Article;

/// Readable content and offline snapshot derived from one article page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedArticle {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub site_name: String,
    pub hero_image: Option<String>,
    /// Complete HTML document with inlined CSS, meant for a sandboxed iframe.
    pub styled_html: String,
}

/// Shape a client stores when saving an article for offline reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArticleSnapshot {
    #[serde(flatten)]
    pub article: Article,
    pub styled_html: String,
    pub site_name: String,
    pub hero_image: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl SavedArticleSnapshot {
    pub fn new(article: Article, extracted: ExtractedArticle) -> Self {
        Self {
            article,
            styled_html: extracted.styled_html,
            site_name: extracted.site_name,
            hero_image: extracted.hero_image,
            saved_at: Utc::now(),
        }
    }
}
