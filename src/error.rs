//! API error types and their wire representation
//!
//! Every error renders as a flat `{"error": "<message>"}` body. Pipeline
//! failures map to a generic 500 message; their detail is logged server-side
//! and never leaked to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::{ResolveError, UrlError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body carried no usable URL (400)
    #[error("URL is required")]
    MissingUrl,

    /// URL was malformed or its host is not allow-listed (400)
    #[error("Invalid URL format")]
    InvalidUrl,

    /// Client exhausted its rate-limit bucket (429)
    #[error("Rate limit exceeded. Try again later.")]
    RateLimited,

    /// Extraction or recognition stage failed (500)
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Any other failure (500)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<UrlError> for ApiError {
    fn from(err: UrlError) -> Self {
        match err {
            UrlError::Missing => ApiError::MissingUrl,
            UrlError::Malformed(_) | UrlError::DisallowedHost(_) => ApiError::InvalidUrl,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingUrl => (StatusCode::BAD_REQUEST, "URL is required"),
            ApiError::InvalidUrl => (StatusCode::BAD_REQUEST, "Invalid URL format"),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Try again later.",
            ),
            ApiError::Resolve(err) => {
                error!("Pipeline failure: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service temporarily unavailable",
                )
            }
            ApiError::Other(err) => {
                error!("Unexpected failure: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service temporarily unavailable",
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
