use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical article produced from any feed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub guid: String,
    pub title: String,
    pub slug: String,
    pub link: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_publication_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub published: bool,
    pub language: String,
    pub category: String,
    pub enclosure: Enclosure,
    pub tags: Vec<String>,
    pub content: ArticleContent,
    pub attachements: Attachments,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleContent {
    pub summary: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_avatar: Option<String>,
}

impl Article {
    /// Publication instant used for ordering; undated articles sort as the epoch.
    pub fn sort_key(&self) -> i64 {
        self.pub_date.map(|d| d.timestamp_millis()).unwrap_or(0)
    }
}
