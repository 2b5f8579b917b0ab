//! Rendered output retrieval handlers.

use crate::api::AppState;
use crate::types::OutputId;
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// GET /files/:output_id - Download a rendered output as an attachment
#[utoipa::path(
    get,
    path = "/api/v1/files/{output_id}",
    tag = "files",
    params(
        ("output_id" = String, Path, description = "Output handle returned by /extract")
    ),
    responses(
        (status = 200, description = "Output file", content_type = "text/plain"),
        (status = 401, description = "Missing or wrong X-API-Password"),
        (status = 404, description = "Output not found or expired", body = crate::error::ApiError)
    ),
    security(("api_password" = []))
)]
pub async fn get_file(State(state): State<AppState>, Path(output_id): Path<String>) -> Response {
    match state.service.get_output(&OutputId::from(output_id)).await {
        Ok(output) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, output.format.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", output.file_name()),
                ),
            ],
            output.content.clone(),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /files/:output_id/content - Read a rendered output inline
#[utoipa::path(
    get,
    path = "/api/v1/files/{output_id}/content",
    tag = "files",
    params(
        ("output_id" = String, Path, description = "Output handle returned by /extract")
    ),
    responses(
        (status = 200, description = "Output body", content_type = "text/plain"),
        (status = 401, description = "Missing or wrong X-API-Password"),
        (status = 404, description = "Output not found or expired", body = crate::error::ApiError)
    ),
    security(("api_password" = []))
)]
pub async fn get_file_content(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
) -> Response {
    match state.service.get_output(&OutputId::from(output_id)).await {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, output.format.content_type())],
            output.content.clone(),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
