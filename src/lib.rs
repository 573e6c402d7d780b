//! # Feedloom
//!
//! RSS/Atom aggregation and readable-article extraction behind a small HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! URLs → ParallelFetcher → [Fetcher → Normalizer] × N → sorted Articles
//! URL  → PageScraper → Fetcher → ContentExtractor → ExtractedArticle
//! ```
//!
//! - [`fetcher`]: HTTP client and concurrent multi-feed aggregation
//! - [`normalizer`]: Converts RSS/Atom items to canonical articles
//! - [`scraper`]: Metadata, readable content and offline snapshots
//! - [`web`]: axum routes over the above
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the API
//! feedloom serve --bind 127.0.0.1:3000
//!
//! # One feed, as JSON
//! feedloom feed https://blog.rust-lang.org/feed.xml
//!
//! # Several feeds merged newest first
//! feedloom feeds https://a.example/feed https://b.example/rss --opml subs.opml
//!
//! # Readable article plus offline snapshot
//! feedloom extract https://example.com/post --html-out post.html
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// fetcher, aggregator, scraper.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/feedloom/config.toml`: listen address, log level,
/// outbound HTTP identity, feed defaults and extraction limits.
pub mod config;

/// Command-line interface using clap.
///
/// - `serve [--bind]` - Run the HTTP API
/// - `feed <url>` - Fetch one feed
/// - `feeds <url>... [--opml <file>]` - Aggregate feeds
/// - `extract <url> [--html-out <file>]` - Extract an article
pub mod cli;

/// Core domain models.
///
/// - [`Article`](domain::Article): Canonical feed item
/// - [`FeedDescriptor`](domain::FeedDescriptor): Source feed metadata
/// - [`ExtractedArticle`](domain::ExtractedArticle): Readable page content
pub mod domain;

/// HTTP fetching and concurrent aggregation.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for outbound GETs
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Settle-all multi-feed fetching
pub mod fetcher;

/// Feed parsing and normalization.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0
/// into canonical [`Article`](domain::Article) structs.
pub mod normalizer;

/// Article page scraping.
///
/// - [`PageScraper`](scraper::PageScraper): Fetch and extract a page
/// - [`ContentExtractor`](scraper::ContentExtractor): Metadata and readable block
/// - [`build_styled_html`](scraper::build_styled_html): Self-contained snapshot
pub mod scraper;

/// Text and URL helpers: entity decoding, URL resolution, summaries, slugs.
pub mod text;

/// HTTP API built with axum.
pub mod web;
