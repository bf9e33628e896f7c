//! toktune — song recognition service for social-media video links
//!
//! Accepts a video URL plus a start offset, extracts a 10-second audio clip
//! through an external downloader, submits it to the audd.io recognition API,
//! and returns formatted track metadata. Request-scoped orchestration only:
//! no persistence, no retries, no caching.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tracing::warn;

pub mod api;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod services;

use config::Config;
use rate_limit::ClientRateLimiter;
use services::{AuddClient, ClipExtractor, SongResolver};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub limiter: Arc<ClientRateLimiter>,
    pub resolver: Arc<SongResolver>,
}

impl AppState {
    /// Build state from resolved configuration
    pub fn new(config: Config) -> Result<Self> {
        let extractor = ClipExtractor::new(
            config.downloader.clone(),
            config.work_dir.clone(),
            config.extraction_timeout,
        );
        let audd = AuddClient::new(config.audd_url.clone(), config.audd_token.clone())?;

        Ok(Self {
            config: Arc::new(config),
            limiter: Arc::new(ClientRateLimiter::default()),
            resolver: Arc::new(SongResolver::new(extractor, audd)),
        })
    }
}

/// Build application router.
///
/// The pipeline route sits behind the rate-limit middleware and the CORS
/// layer restricted to the configured front-end origin; the health endpoint
/// is public.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    let origin = state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| {
            warn!(
                origin = %state.config.allowed_origin,
                "Invalid allowed_origin, falling back to http://localhost:5173"
            );
            HeaderValue::from_static("http://localhost:5173")
        });

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let pipeline = Router::new()
        .route("/api/postlink", post(api::post_link))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(cors);

    let public = Router::new().merge(api::health_routes());

    Router::new().merge(pipeline).merge(public).with_state(state)
}
