use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::app::{FeedloomError, Result};
use crate::fetcher::Fetcher;
use crate::scraper::{ContentExtractor, ScrapeResult, Scraper, ScraperConfig};
use crate::text::origin_of;

/// Scraper fetching pages over a [`Fetcher`] and extracting them in-process.
pub struct PageScraper {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    extractor: ContentExtractor,
}

impl PageScraper {
    pub fn new(config: ScraperConfig, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self {
            extractor: ContentExtractor::new(config, fetcher.clone()),
            fetcher,
        }
    }
}

#[async_trait]
impl Scraper for PageScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapeResult> {
        let parsed = Url::parse(url)?;
        let base_url = origin_of(parsed.as_str()).ok_or_else(|| {
            FeedloomError::InvalidInput(format!("URL has no origin: {url}"))
        })?;

        let html = self.fetcher.fetch_text(url).await?;
        debug!(url = %url, bytes = html.len(), "Fetched article page");

        let article = self.extractor.extract(&html, &base_url).await;
        info!(url = %url, title = %article.title, "Extracted article");

        Ok(ScrapeResult { article, base_url })
    }
}
