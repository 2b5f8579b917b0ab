//! REST API server module
//!
//! Exposes the download/extract lifecycle over HTTP under `/api/v1`, with an
//! OpenAPI 3.1 description and optional Swagger UI.

use crate::service::{API_PREFIX, ExportService};
use crate::{Config, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Jobs (password-gated)
/// - `POST /api/v1/download` - Fetch messages into a new job
/// - `POST /api/v1/extract` - Render a job, optionally narrowed by date
///
/// ## Files (password-gated)
/// - `GET /api/v1/files/:output_id` - Rendered output as an attachment
/// - `GET /api/v1/files/:output_id/content` - Rendered output inline
///
/// ## System (public)
/// - `GET /api/v1/health` - Health check
/// - `GET /api/v1/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(service: Arc<ExportService>, config: Arc<Config>) -> Router {
    let state = AppState::new(service, config.clone());

    let gated = Router::new()
        .route("/download", post(routes::download))
        .route("/extract", post(routes::extract))
        .route("/files/:output_id", get(routes::get_file))
        .route("/files/:output_id/content", get(routes::get_file_content));

    // Auth wraps only the routes registered above
    let gated = if config.server.api.api_password.is_some() {
        gated.layer(middleware::from_fn_with_state(
            config.server.api.api_password.clone(),
            auth::require_api_password,
        ))
    } else {
        tracing::warn!("no API password configured; all routes are open");
        gated
    };

    let public = Router::new()
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = Router::new().nest(API_PREFIX, gated.merge(public));

    // Swagger UI serves its own copy of the document, outside the password gate
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list (or an empty list) allows every origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until SIGTERM/SIGINT, then stops accepting connections and lets
/// in-flight requests finish. Every job and output is dropped with the
/// service once this returns.
///
/// # Example
///
/// ```no_run
/// use slack_dm_export::{Config, ExportService, SlackMessageSource};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::from_env()?;
/// let source = Arc::new(SlackMessageSource::new(config.slack.clone())?);
/// let service = Arc::new(ExportService::new(config.clone(), source));
///
/// // Start API server (blocks until shutdown)
/// slack_dm_export::api::start_api_server(service, Arc::new(config)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(service: Arc<ExportService>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(service, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::wait_for_signal())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
