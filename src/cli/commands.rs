use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::app::{AppContext, FeedloomError, Result};
use crate::scraper::Scraper;
use crate::web::{self, AppState};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| FeedloomError::Other(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

pub async fn serve(ctx: AppContext, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| ctx.config.server.bind.clone());
    web::serve(Arc::new(AppState::new(ctx)), &bind).await
}

pub async fn fetch_feed(ctx: &AppContext, url: &str) -> Result<()> {
    let parsed = ctx.parallel_fetcher.fetch_feed(url).await?;
    eprintln!(
        "{}: {} items",
        parsed.feed.display_title(),
        parsed.items.len()
    );
    print_json(&parsed)
}

pub async fn fetch_feeds(ctx: &AppContext, urls: Vec<String>, opml: Option<&Path>) -> Result<()> {
    let mut urls = urls;

    if let Some(path) = opml {
        let content = std::fs::read_to_string(path)?;
        let feeds = parse_opml(&content);
        eprintln!("Found {} feeds in OPML file", feeds.len());
        urls.extend(feeds.into_iter().map(|(_, url)| url));
    }

    let aggregated = ctx.parallel_fetcher.fetch_all(&urls).await?;
    eprintln!(
        "Aggregated {} of {} feeds: {} items",
        aggregated.feeds.len(),
        urls.len(),
        aggregated.items.len()
    );
    print_json(&aggregated)
}

pub async fn extract_article(ctx: &AppContext, url: &str, html_out: Option<&Path>) -> Result<()> {
    let result = ctx.scraper.scrape(url).await?;

    if let Some(path) = html_out {
        std::fs::write(path, &result.article.styled_html)?;
        eprintln!("Snapshot written to {}", path.display());
    }

    print_json(&web::handlers::ExtractResponse {
        success: true,
        article: result.article,
        base_url: result.base_url,
    })
}

/// Parse OPML content and extract feed URLs with titles
fn parse_opml(content: &str) -> Vec<(String, String)> {
    let mut feeds = Vec::new();

    for line in content.lines() {
        if line.contains("xmlUrl") {
            if let Some(url) = extract_attr(line, "xmlUrl") {
                let title = extract_attr(line, "title")
                    .or_else(|| extract_attr(line, "text"))
                    .unwrap_or_else(|| url.clone());
                feeds.push((title, url));
            }
        }
    }

    feeds
}

/// Extract an attribute value from an XML element string
fn extract_attr(line: &str, attr: &str) -> Option<String> {
    let pattern = format!(" {}=\"", attr);
    let start = line.find(&pattern)? + pattern.len();
    let rest = &line[start..];
    let end = rest.find('"')?;
    let value = &rest[..end];
    Some(html_escape::decode_html_entities(value).to_string())
}
