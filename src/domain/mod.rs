pub mod article;
pub mod extracted;
pub mod feed;

pub use article::{Article, ArticleContent, Attachments, Enclosure};
pub use extracted::{ExtractedArticle, SavedArticleSnapshot};
pub use feed::{AggregatedFeeds, FeedDescriptor, ParsedFeed};
