//! # slack-dm-export
//!
//! Backend for pulling a Slack user's messages over a date range and turning
//! them into readable exports, in two steps:
//!
//! 1. **Download** - fetch the raw messages from a [`MessageSource`] and
//!    cache them server-side as a job, returning its id.
//! 2. **Extract** - look the job up, optionally narrow it to a smaller date
//!    window, render it with an [`Exporter`](export::Exporter) and keep the
//!    output retrievable by a second id.
//!
//! Jobs and outputs live in memory only and expire after a configurable TTL.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slack_dm_export::{Config, DownloadRequest, ExportService, ExtractRequest, SlackMessageSource};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let source = Arc::new(SlackMessageSource::new(config.slack.clone())?);
//!     let service = ExportService::new(config, source);
//!
//!     let download = service
//!         .download(&DownloadRequest {
//!             user_id: "U012AB3CD".into(),
//!             start_date: "2025-03-07".into(),
//!             end_date: "2025-03-09".into(),
//!         })
//!         .await?;
//!
//!     let extract = service
//!         .extract(&ExtractRequest {
//!             job_id: download.job_id.to_string(),
//!             start_date: Some("2025-03-08".into()),
//!             end_date: Some("2025-03-08".into()),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     for entry in &extract.messages {
//!         println!("{entry}\n");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Message exporters
pub mod export;
/// Download and extract orchestration
pub mod service;
/// Message sources
pub mod source;
/// In-memory job and output stores
pub mod store;
/// Core types and request/response bodies
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, Result, SourceError, ToHttpStatus};
pub use export::{Exporter, JsonExporter, PlainTextExporter, RenderedExport};
pub use service::ExportService;
pub use source::{MessageSource, SlackMessageSource};
pub use store::{ExtractedOutput, Job, JobStore, OutputStore};
pub use types::{
    DateRange, DownloadRequest, DownloadResponse, ExportFormat, ExtractRequest, ExtractResponse,
    JobId, OutputId, RawMessage,
};

/// Resolve once the process is asked to stop.
///
/// - **Unix:** SIGTERM or SIGINT, falling back to whichever handler could be
///   registered, then to `ctrl_c`.
/// - **Windows/other:** Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down"),
                _ = sigint.recv() => tracing::info!("Received SIGINT, shutting down"),
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT, shutting down");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM, shutting down");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

/// Resolve once the process is asked to stop (Ctrl+C).
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
