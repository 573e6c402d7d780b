pub mod http_fetcher;
pub mod memory;
pub mod parallel;

use async_trait::async_trait;

use crate::app::Result;

#[async_trait]
pub trait Fetcher {
    /// GET `url` and return the body.
    ///
    /// Non-success statuses are errors carrying the status code.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// GET `url` and decode the body as (lossy) UTF-8.
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
