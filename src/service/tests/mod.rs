use super::test_helpers::{
    StaticMessageSource, create_test_service, create_test_service_with, message,
};
use super::*;
use crate::error::{Error, SourceError};
use crate::types::{DownloadRequest, ExportFormat, ExtractRequest, JobId, OutputId};


fn download_request(user_id: &str, start: &str, end: &str) -> DownloadRequest {
    DownloadRequest {
        user_id: user_id.to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
    }
}

fn extract_request(job_id: &JobId) -> ExtractRequest {
    ExtractRequest {
        job_id: job_id.to_string(),
        ..Default::default()
    }
}

fn narrowed(job_id: &JobId, start: Option<&str>, end: Option<&str>) -> ExtractRequest {
    ExtractRequest {
        job_id: job_id.to_string(),
        start_date: start.map(str::to_string),
        end_date: end.map(str::to_string),
        ..Default::default()
    }
}

/// Download the whole sample range for U123 and return the job id
async fn download_sample(service: &ExportService) -> JobId {
    service
        .download(&download_request("U123", "2025-03-07", "2025-03-09"))
        .await
        .unwrap()
        .job_id
}
