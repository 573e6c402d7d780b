use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::app::{FeedloomError, Result};
use crate::domain::{AggregatedFeeds, ParsedFeed};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

/// Fetches and normalizes many feeds at once.
///
/// Every feed runs in its own task, all started at once; one slow or broken
/// feed never cancels or delays the others.
#[derive(Clone)]
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, normalizer: Normalizer) -> Self {
        Self {
            fetcher,
            normalizer,
        }
    }

    /// Fetch and normalize a single feed.
    ///
    /// Any failure (transport, status, unparseable body) comes back as
    /// [`FeedloomError::FeedFetch`] carrying the underlying message.
    pub async fn fetch_feed(&self, url: &str) -> Result<ParsedFeed> {
        fetch_single_feed(self.fetcher.as_ref(), &self.normalizer, url)
            .await
            .map_err(|e| FeedloomError::FeedFetch(e.to_string()))
    }

    /// Fetch every feed concurrently and wait for all of them to settle.
    ///
    /// Returns one outcome per input URL, in input order.
    pub async fn fetch_all_settled(&self, urls: &[String]) -> Vec<(String, Result<ParsedFeed>)> {
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let this = self.clone();
            let url = url.clone();

            let handle = tokio::spawn(async move {
                let result = this.fetch_feed(&url).await;
                (url, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("Task join error: {}", e);
                }
            }
        }

        results
    }

    /// Aggregate several feeds into one newest-first article list.
    ///
    /// Failed feeds are logged and left out of both `feeds` and `items`.
    /// Undated articles sort last; ties keep input order. When several
    /// articles share a guid only the first one after sorting is kept.
    pub async fn fetch_all(&self, urls: &[String]) -> Result<AggregatedFeeds> {
        if urls.is_empty() {
            return Err(FeedloomError::InvalidInput(
                "at least one feed URL is required".into(),
            ));
        }

        let mut aggregated = AggregatedFeeds::default();
        let mut failed = 0usize;

        for (url, result) in self.fetch_all_settled(urls).await {
            match result {
                Ok(parsed) => {
                    aggregated.feeds.push(parsed.feed);
                    aggregated.items.extend(parsed.items);
                }
                Err(e) => {
                    failed += 1;
                    warn!(url = %url, error = %e, "Failed to parse feed");
                }
            }
        }

        aggregated.items.sort_by_key(|item| Reverse(item.sort_key()));

        let before = aggregated.items.len();
        let mut seen = HashSet::new();
        aggregated.items.retain(|item| seen.insert(item.guid.clone()));

        info!(
            feeds = aggregated.feeds.len(),
            failed,
            duplicates = before - aggregated.items.len(),
            items = aggregated.items.len(),
            "Aggregated feeds"
        );

        Ok(aggregated)
    }
}

async fn fetch_single_feed(
    fetcher: &(dyn Fetcher + Send + Sync),
    normalizer: &Normalizer,
    url: &str,
) -> Result<ParsedFeed> {
    let body = fetcher.fetch(url).await?;
    let parsed = normalizer.normalize(url, &body)?;

    debug!(url = %url, items = parsed.items.len(), "Parsed feed");

    Ok(parsed)
}
