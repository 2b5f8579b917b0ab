//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] - Download and extract
//! - [`files`] - Rendered output retrieval
//! - [`system`] - Health, OpenAPI

use crate::error::Error;
use axum::extract::rejection::JsonRejection;

mod files;
mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use files::*;
pub use jobs::*;
pub use system::*;

/// Map a JSON body rejection onto our own `invalid_request` error body
pub(crate) fn invalid_body(rejection: JsonRejection) -> Error {
    Error::InvalidRequest(rejection.body_text())
}
