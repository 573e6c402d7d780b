use serde::{Deserialize, Serialize};

use crate::domain::Article;

/// Metadata of one successfully parsed source feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub url: String,
    pub title: String,
    pub description: String,
    pub link: String,
}

/// Result of fetching a single feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFeed {
    pub feed: FeedDescriptor,
    pub items: Vec<Article>,
}

/// Merged result of fetching several feeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedFeeds {
    pub feeds: Vec<FeedDescriptor>,
    pub items: Vec<Article>,
}

impl FeedDescriptor {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}
