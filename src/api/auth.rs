//! Authentication middleware for the REST API
//!
//! Shared-secret check on the X-API-Password header. When
//! ApiConfig::api_password is set, every gated request must carry a
//! matching header or it receives a 401 Unauthorized response. The secret
//! is an opaque string: no trimming, no case folding.

use crate::error::ApiError;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the shared secret
pub const PASSWORD_HEADER: &str = "x-api-password";

/// Authentication middleware that checks the X-API-Password header
///
/// # Arguments
///
/// * `State(expected_password)` - The secret that must be present in the X-API-Password header
/// * `request` - The incoming HTTP request
/// * `next` - The next middleware/handler in the chain
///
/// # Returns
///
/// Returns either:
/// - 401 Unauthorized if the password is missing or wrong
/// - The response from the next handler if authentication succeeds
///
/// # Examples
///
/// ```no_run
/// use axum::{Router, middleware};
/// use slack_dm_export::api::auth::require_api_password;
///
/// let password = Some("s3cret".to_string());
/// let router: Router = Router::new()
///     .layer(middleware::from_fn_with_state(
///         password,
///         require_api_password
///     ));
/// ```
pub async fn require_api_password(
    State(expected_password): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_password else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(PASSWORD_HEADER)
        .map(|value| value.as_bytes());

    match provided {
        Some(provided) if constant_time_eq(provided, expected.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "rejected request with wrong API password");
            unauthorized_response("Invalid API password")
        }
        None => unauthorized_response("Missing X-API-Password header"),
    }
}

/// Constant-time byte comparison to prevent timing side-channel attacks.
/// Always compares all bytes regardless of where the first mismatch occurs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Helper function to create a 401 Unauthorized response with a JSON error message
fn unauthorized_response(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized(message))).into_response()
}
