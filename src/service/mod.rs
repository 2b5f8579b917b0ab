//! Export service: the download and extract orchestrators.
//!
//! The `ExportService` struct and its methods are organized by domain:
//! - [`download`] - validate a request, fetch from the message source, create a job
//! - [`extract`] - narrow a job's messages, render them, store the output

mod download;
mod extract;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::Config;
use crate::source::MessageSource;
use crate::store::{JobStore, OutputStore};

/// Path prefix the HTTP surface mounts its routes under
pub const API_PREFIX: &str = "/api/v1";

/// Main service instance (cloneable - all fields are Arc-wrapped)
///
/// Owns both stores. Dropping the last clone drops every job and output.
#[derive(Clone)]
pub struct ExportService {
    /// Where downloads fetch their messages from
    pub(crate) source: Arc<dyn MessageSource>,
    /// Download jobs
    pub(crate) jobs: Arc<JobStore>,
    /// Rendered extract outputs
    pub(crate) outputs: Arc<OutputStore>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
}

impl ExportService {
    /// Create a service with empty stores sized by `config.retention`
    pub fn new(config: Config, source: Arc<dyn MessageSource>) -> Self {
        tracing::info!(
            source = source.name(),
            job_ttl = ?config.retention.job_ttl,
            output_ttl = ?config.retention.output_ttl,
            "export service initialized"
        );

        Self {
            jobs: Arc::new(JobStore::new(config.retention.job_ttl)),
            outputs: Arc::new(OutputStore::new(config.retention.output_ttl)),
            source,
            config: Arc::new(config),
        }
    }

    /// Job store backing this service
    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    /// Output store backing this service
    pub fn outputs(&self) -> &OutputStore {
        &self.outputs
    }

    /// Configuration the service was built with
    pub fn config(&self) -> &Config {
        &self.config
    }
}
