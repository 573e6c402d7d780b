//! Article page scraping: readable content plus an offline snapshot.
//!
//! # Architecture
//!
//! ```text
//! URL → Fetcher (page HTML) → ContentExtractor → ExtractedArticle
//!                                   ├─ metadata chains (title, site, hero, excerpt)
//!                                   ├─ readable block + cleanup
//!                                   └─ snapshot (inlined CSS, absolute URLs)
//! ```
//!
//! Everything here works on raw markup with regular expressions; no DOM is
//! built and no script runs.
//!
//! # Usage
//!
//! ```rust,ignore
//! use feedloom::scraper::{PageScraper, Scraper, ScraperConfig};
//!
//! let scraper = PageScraper::new(ScraperConfig::default(), fetcher);
//! let result = scraper.scrape("https://example.com/article").await?;
//! println!("{}", result.article.title);
//! ```

mod config;
mod extractor;
mod html;
mod page;
mod snapshot;

pub use config::ScraperConfig;
pub use extractor::{
    clean_article_content, extract_excerpt, extract_hero_image, extract_site_name, extract_title,
    readable_block, ContentExtractor,
};
pub use html::fix_urls;
pub use page::PageScraper;
pub use snapshot::{build_styled_html, collect_stylesheets, fix_css_urls, PageStyles};

use crate::app::Result;
use crate::domain::ExtractedArticle;
use async_trait::async_trait;

/// Result of a scraping operation
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    /// Extracted article and its snapshot
    pub article: ExtractedArticle,
    /// Origin of the page (`scheme://host[:port]`), used to resolve relative URLs
    pub base_url: String,
}

/// Trait for article scraping implementations
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Fetch `url` and extract its article content
    async fn scrape(&self, url: &str) -> Result<ScrapeResult>;
}
