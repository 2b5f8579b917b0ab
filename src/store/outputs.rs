//! Rendered extract outputs, held so a follow-up file fetch can serve them.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::ExpiringMap;
use crate::error::{Error, Result};
use crate::types::{ExportFormat, JobId, OutputId};

/// Result of one extract call
#[derive(Debug, Clone)]
pub struct ExtractedOutput {
    /// Output handle
    pub id: OutputId,
    /// Job the output was rendered from
    pub job_id: JobId,
    /// Format the content is in
    pub format: ExportFormat,
    /// Rendered body
    pub content: String,
    /// Render time, used for expiry
    pub created_at: DateTime<Utc>,
}

impl ExtractedOutput {
    /// Suggested download file name
    pub fn file_name(&self) -> String {
        format!("slack_messages_{}.{}", self.id, self.format.extension())
    }
}

/// Process-scoped store of rendered outputs
pub struct OutputStore {
    outputs: ExpiringMap<OutputId, ExtractedOutput>,
}

impl OutputStore {
    /// Create an empty store; `ttl = None` keeps outputs for the process lifetime
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            outputs: ExpiringMap::new(ttl),
        }
    }

    /// Store rendered content and return its handle
    pub async fn put(&self, job_id: JobId, format: ExportFormat, content: String) -> OutputId {
        let output = ExtractedOutput {
            id: OutputId::generate(),
            job_id,
            format,
            content,
            created_at: Utc::now(),
        };
        let id = output.id.clone();
        let created_at = output.created_at;
        let bytes = output.content.len();
        self.outputs.insert(id.clone(), output, created_at).await;
        tracing::debug!(output_id = %id, bytes, "stored rendered output");
        id
    }

    /// Fetch an output, failing with [`Error::OutputNotFound`] if unknown or expired
    pub async fn get(&self, id: &OutputId) -> Result<Arc<ExtractedOutput>> {
        self.outputs
            .get(id, Utc::now())
            .await
            .ok_or_else(|| Error::OutputNotFound { id: id.to_string() })
    }

    /// Number of live outputs
    pub async fn len(&self) -> usize {
        self.outputs.live_count(Utc::now()).await
    }

    /// Whether the store holds no live outputs
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every output
    pub async fn clear(&self) {
        self.outputs.clear().await;
    }
}
