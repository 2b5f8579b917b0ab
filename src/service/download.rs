//! Download orchestration

use super::ExportService;
use crate::error::{Error, Result};
use crate::types::{DateRange, DownloadRequest, DownloadResponse, OperationStatus};

impl ExportService {
    /// Fetch a user's messages and store them as a new job
    ///
    /// Exactly one job is created per successful call and none on failure.
    ///
    /// # Errors
    /// - [`Error::InvalidRequest`] for an empty user id or a bad date range
    /// - [`Error::Source`] if the message source fails
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadResponse> {
        let user_id = request.user_id.trim();
        if user_id.is_empty() {
            return Err(Error::InvalidRequest("user_id must not be empty".into()));
        }
        let range = DateRange::parse(&request.start_date, &request.end_date)?;

        tracing::info!(user_id, range = %range, source = self.source.name(), "starting download");

        let messages = self
            .source
            .fetch_messages(user_id, &range)
            .await
            .map_err(|e| {
                tracing::warn!(user_id, range = %range, reason = e.reason(), error = %e, "download failed");
                Error::Source(e)
            })?;

        let message_count = messages.len();
        let job_id = self.jobs.create(user_id, range, messages).await;

        Ok(DownloadResponse {
            status: OperationStatus::Success,
            message_count,
            download_location: format!("memory://{job_id}"),
            job_id,
        })
    }
}
