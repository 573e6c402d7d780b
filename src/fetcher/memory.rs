//! In-memory [`Fetcher`] serving canned responses.
//!
//! Used by tests and by offline demos; unknown URLs answer 404.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{FeedloomError, Result};
use crate::fetcher::Fetcher;

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    body: Vec<u8>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, CannedResponse>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 for `url`.
    pub fn with_body(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_response(url, 200, body)
    }

    pub fn with_response(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(
            url.to_string(),
            CannedResponse {
                status,
                body: body.into(),
                delay: None,
            },
        );
        self
    }

    /// Hold the response for `url` back by `delay`.
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        if let Some(response) = self.responses.get_mut(url) {
            response.delay = Some(delay);
        }
        self
    }

    /// Every URL requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        let Some(response) = self.responses.get(url).cloned() else {
            return Err(FeedloomError::Status {
                url: url.to_string(),
                status: 404,
            });
        };

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }

        if !(200..300).contains(&response.status) {
            return Err(FeedloomError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_canned_body() {
        let fetcher = MemoryFetcher::new().with_body("https://example.com/a", "hello");
        let body = fetcher.fetch_text("https://example.com/a").await.unwrap();
        assert_eq!(body, "hello");
        assert_eq!(fetcher.requests(), vec!["https://example.com/a".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_url_is_404() {
        let fetcher = MemoryFetcher::new();
        let err = fetcher.fetch("https://example.com/missing").await.unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_error_status() {
        let fetcher = MemoryFetcher::new().with_response("https://example.com/a", 503, "busy");
        let err = fetcher.fetch("https://example.com/a").await.unwrap_err();
        assert!(matches!(err, FeedloomError::Status { status: 503, .. }));
    }
}
