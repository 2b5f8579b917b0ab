//! Error types for slack-dm-export
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (message source failures, lookups, rendering)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for slack-dm-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for slack-dm-export
///
/// Every failure is scoped to a single request. None of these variants leave
/// the job or output stores in a partially updated state.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "SLACK_BOT_TOKEN")
        key: Option<String>,
    },

    /// Malformed or missing request input (no job is created)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The message source (Slack Web API) failed
    #[error("message source error: {0}")]
    Source(#[from] SourceError),

    /// Job id is unknown or the job has expired
    #[error("job {id} not found")]
    JobNotFound {
        /// The job id that was looked up
        id: String,
    },

    /// Output handle is unknown or the output has expired
    #[error("output {id} not found")]
    OutputNotFound {
        /// The output id that was looked up
        id: String,
    },

    /// Exporter failed to render a message batch (the job remains valid)
    #[error("render error: {0}")]
    Render(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Failures reported by a [`MessageSource`](crate::source::MessageSource)
///
/// Each variant is a sub-reason surfaced to the caller. The download
/// lifecycle never retries any of them.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Token is missing, revoked or rejected by Slack
    #[error("Slack token rejected: {0}")]
    InvalidToken(String),

    /// Token lacks a scope required for the call
    #[error("Slack token is missing a required scope: {needed}")]
    MissingScope {
        /// Scope(s) Slack reported as needed, when available
        needed: String,
    },

    /// Slack answered with HTTP 429
    #[error("rate limited by Slack (retry after {retry_after_secs:?}s)")]
    RateLimited {
        /// Value of the Retry-After header, when present
        retry_after_secs: Option<u64>,
    },

    /// Transport-level failure (DNS, connect, timeout)
    #[error("network error calling {method}: {reason}")]
    Network {
        /// Slack API method being called
        method: String,
        /// Underlying transport error
        reason: String,
    },

    /// Slack returned `ok: false` with an error code
    #[error("Slack API {method} failed: {code}")]
    Api {
        /// Slack API method being called
        method: String,
        /// Slack's error code (e.g., "user_not_found")
        code: String,
    },

    /// Response body was not the JSON shape we expect
    #[error("malformed response from {method}: {reason}")]
    MalformedResponse {
        /// Slack API method being called
        method: String,
        /// What was wrong with the body
        reason: String,
    },
}

impl SourceError {
    /// Machine-readable sub-reason
    pub fn reason(&self) -> &'static str {
        match self {
            SourceError::InvalidToken(_) => "invalid_token",
            SourceError::MissingScope { .. } => "missing_scope",
            SourceError::RateLimited { .. } => "rate_limited",
            SourceError::Network { .. } => "network",
            SourceError::Api { .. } => "api",
            SourceError::MalformedResponse { .. } => "malformed_response",
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "job_not_found",
///     "message": "job 3f2a... not found",
///     "details": {
///       "job_id": "3f2a..."
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "job_not_found", "invalid_request")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::InvalidRequest(_) => 400,

            // 404 Not Found - recoverable by re-running the download
            Error::JobNotFound { .. } => 404,
            Error::OutputNotFound { .. } => 404,

            // 429 - upstream throttling, caller decides when to retry
            Error::Source(SourceError::RateLimited { .. }) => 429,

            // 502 Bad Gateway - Slack failures
            Error::Source(_) => 502,

            // 500 Internal Server Error - Server-side issues
            Error::Config { .. } => 500,
            Error::Render(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Source(_) => "source_error",
            Error::JobNotFound { .. } => "job_not_found",
            Error::OutputNotFound { .. } => "output_not_found",
            Error::Render(_) => "render_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::JobNotFound { id } => Some(serde_json::json!({ "job_id": id })),
            Error::OutputNotFound { id } => Some(serde_json::json!({ "output_id": id })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::Source(SourceError::RateLimited { retry_after_secs }) => {
                Some(serde_json::json!({
                    "reason": "rate_limited",
                    "retry_after_secs": retry_after_secs,
                }))
            }
            Error::Source(source) => Some(serde_json::json!({ "reason": source.reason() })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
