//! Extract orchestration and output retrieval

use std::sync::Arc;

use super::{API_PREFIX, ExportService};
use crate::error::{Error, Result};
use crate::export::exporter_for;
use crate::store::{ExtractedOutput, Job};
use crate::types::{
    DateRange, ExtractRequest, ExtractResponse, JobId, OperationStatus, OutputId, parse_date,
};

impl ExportService {
    /// Render a stored job, optionally narrowed to a date window
    ///
    /// Repeating a call with the same job and window yields byte-identical
    /// content. The job itself is never modified.
    ///
    /// # Errors
    /// - [`Error::JobNotFound`] if the job is unknown or expired
    /// - [`Error::InvalidRequest`] if the window is malformed or misses the job's range
    /// - [`Error::Render`] if the exporter fails
    pub async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        let job = self.jobs.get(&JobId::from(request.job_id.trim())).await?;
        let window = narrowing_window(&job, request)?;

        let filtered: Vec<_> = match window {
            Some(window) => job
                .raw_messages
                .iter()
                .filter(|m| m.date().is_some_and(|d| window.contains(d)))
                .cloned()
                .collect(),
            None => job.raw_messages.clone(),
        };

        let exporter = exporter_for(request.format);
        let rendered = exporter.render(&filtered).inspect_err(|e| {
            tracing::error!(job_id = %job.id, error = %e, "render failed");
        })?;

        let rendered_message_count = rendered.entries.len();
        let output_id = self
            .outputs
            .put(job.id.clone(), request.format, rendered.content)
            .await;

        tracing::info!(
            job_id = %job.id,
            output_id = %output_id,
            window = ?window.map(|w| w.to_string()),
            extracted = filtered.len(),
            rendered = rendered_message_count,
            "extract complete"
        );

        let mut messages = rendered.entries;
        messages.truncate(self.config.export.preview_limit);

        Ok(ExtractResponse {
            status: OperationStatus::Success,
            extracted_message_count: filtered.len(),
            rendered_message_count,
            output_file_url: format!("{API_PREFIX}/files/{output_id}"),
            output_content_url: format!("{API_PREFIX}/files/{output_id}/content"),
            output_id,
            messages,
        })
    }

    /// Fetch a rendered output by handle
    ///
    /// # Errors
    /// Returns [`Error::OutputNotFound`] if the handle is unknown or expired
    pub async fn get_output(&self, output_id: &OutputId) -> Result<Arc<ExtractedOutput>> {
        self.outputs.get(output_id).await
    }
}

/// Effective window for an extract, or `None` when no narrowing was asked for
///
/// A missing bound falls back to the job's own bound. The result is the
/// intersection with the job's range.
fn narrowing_window(job: &Job, request: &ExtractRequest) -> Result<Option<DateRange>> {
    let start = non_blank(request.start_date.as_deref());
    let end = non_blank(request.end_date.as_deref());
    if start.is_none() && end.is_none() {
        return Ok(None);
    }

    let start = match start {
        Some(value) => parse_date("start_date", value)?,
        None => job.requested_range.start,
    };
    let end = match end {
        Some(value) => parse_date("end_date", value)?,
        None => job.requested_range.end,
    };

    let requested = DateRange::new(start, end)?;
    requested
        .intersect(&job.requested_range)
        .map(Some)
        .ok_or_else(|| {
            Error::InvalidRequest(format!(
                "date range {requested} does not overlap job range {}",
                job.requested_range
            ))
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
