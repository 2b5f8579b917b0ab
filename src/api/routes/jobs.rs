//! Download and extract handlers.

use super::invalid_body;
use crate::api::AppState;
use crate::types::{DownloadRequest, ExtractRequest};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /download - Fetch a user's messages and store them as a job
#[utoipa::path(
    post,
    path = "/api/v1/download",
    tag = "jobs",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Job created", body = crate::types::DownloadResponse),
        (status = 400, description = "Invalid user id or date range", body = crate::error::ApiError),
        (status = 401, description = "Missing or wrong X-API-Password"),
        (status = 429, description = "Slack rate limit hit", body = crate::error::ApiError),
        (status = 502, description = "Slack request failed", body = crate::error::ApiError)
    ),
    security(("api_password" = []))
)]
pub async fn download(
    State(state): State<AppState>,
    body: Result<Json<DownloadRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_body(rejection).into_response(),
    };

    match state.service.download(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /extract - Render a stored job, optionally narrowed by date
#[utoipa::path(
    post,
    path = "/api/v1/extract",
    tag = "jobs",
    request_body = ExtractRequest,
    responses(
        (status = 200, description = "Output rendered", body = crate::types::ExtractResponse),
        (status = 400, description = "Invalid date window", body = crate::error::ApiError),
        (status = 401, description = "Missing or wrong X-API-Password"),
        (status = 404, description = "Job not found or expired", body = crate::error::ApiError),
        (status = 500, description = "Rendering failed", body = crate::error::ApiError)
    ),
    security(("api_password" = []))
)]
pub async fn extract(
    State(state): State<AppState>,
    body: Result<Json<ExtractRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_body(rejection).into_response(),
    };

    match state.service.extract(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}
