//! HTTP API over the feed aggregator and article extractor.
//!
//! Routes:
//!
//! - `GET  /api/rss/parse?url=…` - one feed
//! - `POST /api/rss/parse-multiple` - several feeds, newest first
//! - `POST /api/article/extract` - readable content and offline snapshot
//! - `GET  /api/health` - liveness

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::{FeedloomError, Result};

pub use error::ApiError;
pub use handlers::AppState;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let rss_routes = Router::new()
        .route("/parse", get(handlers::parse_feed))
        .route("/parse-multiple", post(handlers::parse_multiple));

    let api_routes = Router::new()
        .nest("/rss", rss_routes)
        .route("/article/extract", post(handlers::extract_article))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer()),
        )
        .with_state(app_state)
}

/// Any origin may call the API; it holds no credentials.
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any)
}

/// Bind `addr` and serve the API until the process is stopped.
pub async fn serve(app_state: Arc<AppState>, addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| FeedloomError::Config(format!("invalid bind address {addr}: {e}")))?;

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, create_router(app_state)).await?;

    Ok(())
}
