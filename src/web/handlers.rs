//! API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::app::{AppContext, FeedloomError};
use crate::domain::{AggregatedFeeds, ExtractedArticle, ParsedFeed};
use crate::scraper::Scraper;

use super::error::ApiError;

const MISSING_URL_PARAM: &str = "Missing 'url' query param";
const INVALID_URLS: &str = "Missing or invalid 'urls' array in request body";
const NON_STRING_URLS: &str = "All URLs must be strings";
const MISSING_URL_BODY: &str = "Missing 'url' in request body";
const INVALID_URL_BODY: &str = "Invalid 'url' in request body";

/// Shared state for all handlers.
pub struct AppState {
    pub ctx: AppContext,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            started_at: Instant::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ParseQuery {
    pub url: Option<String>,
}

/// `GET /api/rss/parse?url=…`
pub async fn parse_feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ParseQuery>,
) -> Result<Json<ParsedFeed>, ApiError> {
    let url = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request(MISSING_URL_PARAM))?;

    match state.ctx.parallel_fetcher.fetch_feed(&url).await {
        Ok(parsed) => Ok(Json(parsed)),
        Err(e) => {
            error!(url = %url, error = %e, "Failed to fetch RSS feed");
            Err(ApiError::upstream("Failed to fetch RSS feed", e.to_string()))
        }
    }
}

/// Pull a non-empty list of strings out of `{urls: [...]}`.
fn validate_urls(body: &Value) -> Result<Vec<String>, ApiError> {
    let urls = body
        .get("urls")
        .and_then(Value::as_array)
        .filter(|urls| !urls.is_empty())
        .ok_or_else(|| ApiError::bad_request(INVALID_URLS))?;

    urls.iter()
        .map(|url| url.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ApiError::bad_request(NON_STRING_URLS))
}

/// `POST /api/rss/parse-multiple`
pub async fn parse_multiple(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AggregatedFeeds>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::bad_request(INVALID_URLS))?;
    let urls = validate_urls(&body)?;

    match state.ctx.parallel_fetcher.fetch_all(&urls).await {
        Ok(aggregated) => Ok(Json(aggregated)),
        Err(e) if e.is_client_error() => Err(ApiError::bad_request(INVALID_URLS)),
        Err(e) => {
            error!(error = %e, "Failed to fetch RSS feeds");
            Err(ApiError::upstream("Failed to fetch RSS feeds", e.to_string()))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(flatten)]
    pub article: ExtractedArticle,
    pub base_url: String,
}

/// `POST /api/article/extract`
pub async fn extract_article(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::bad_request(MISSING_URL_BODY))?;
    let url = body
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request(MISSING_URL_BODY))?;

    match state.ctx.scraper.scrape(url).await {
        Ok(result) => {
            info!(url = %url, "Article extracted");
            Ok(Json(ExtractResponse {
                success: true,
                article: result.article,
                base_url: result.base_url,
            }))
        }
        Err(e) if e.is_client_error() => Err(ApiError::bad_request(INVALID_URL_BODY)),
        Err(e @ FeedloomError::Status { status, .. }) => {
            error!(url = %url, status, "Failed to fetch article");
            Err(ApiError::upstream(
                format!("Failed to fetch article: {status}"),
                e.to_string(),
            ))
        }
        Err(e) => {
            error!(url = %url, error = %e, "Error extracting article");
            Err(ApiError::upstream(
                "Failed to extract article content",
                e.to_string(),
            ))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started
    pub uptime: f64,
}

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
