//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the slack-dm-export REST
//! API using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the slack-dm-export REST API
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "slack-dm-export REST API",
        version = "0.1.0",
        description = "Download a Slack user's messages over a date range into a server-side job, then extract readable exports from it"
    ),
    servers(
        (url = "http://localhost:8000/api/v1", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::download,
        crate::api::routes::extract,

        // Files
        crate::api::routes::get_file,
        crate::api::routes::get_file_content,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Request/response types from types.rs
        crate::types::DownloadRequest,
        crate::types::DownloadResponse,
        crate::types::ExtractRequest,
        crate::types::ExtractResponse,
        crate::types::ExportFormat,
        crate::types::OperationStatus,
        crate::types::HealthResponse,
        crate::types::JobId,
        crate::types::OutputId,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Download messages into a job and extract exports from it"),
        (name = "files", description = "Rendered export retrieval"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security addon to add the shared-password scheme to the OpenAPI spec
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_password",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-API-Password"),
                    ),
                ),
            );
        }
    }
}
