//! POST /api/postlink — the recognition pipeline entry point

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::AppState;

/// Inbound request body
#[derive(Debug, Deserialize)]
pub struct PostLinkRequest {
    pub url: Option<String>,
    pub minute: Option<String>,
    pub second: Option<String>,
}

/// Successful response body
#[derive(Debug, Serialize)]
pub struct PostLinkResponse {
    pub result: String,
}

/// POST /api/postlink
///
/// Validates the source URL, formats the clip start offset, extracts a
/// 10-second clip, and submits it for recognition. Stage failures surface as
/// a generic 500; a no-match from the recognition API is a 200 with the
/// not-found text in `result`.
pub async fn post_link(
    State(state): State<AppState>,
    Json(request): Json<PostLinkRequest>,
) -> ApiResult<Json<PostLinkResponse>> {
    let raw_url = request.url.as_deref().unwrap_or("");
    if raw_url.trim().is_empty() {
        return Err(ApiError::MissingUrl);
    }

    let url = services::validate(raw_url)?;
    let start = services::format_start(request.minute.as_deref(), request.second.as_deref());

    info!(host = %url.host(), start = %start, "Processing link");

    let result = state.resolver.resolve(&url, &start).await?;
    Ok(Json(PostLinkResponse { result }))
}
