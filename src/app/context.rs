use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::scraper::{PageScraper, Scraper};

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
    pub scraper: Arc<dyn Scraper>,
}

impl AppContext {
    /// Wire every component over a real HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Wire every component over the given fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        let normalizer = Normalizer::with_config(&config.feeds);
        let parallel_fetcher = ParallelFetcher::new(fetcher.clone(), normalizer);
        let scraper: Arc<dyn Scraper> =
            Arc::new(PageScraper::new(config.scraper.clone(), fetcher.clone()));

        Self {
            config,
            fetcher,
            parallel_fetcher,
            scraper,
        }
    }
}
