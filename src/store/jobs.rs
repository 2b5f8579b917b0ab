//! Download job records and their store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::ExpiringMap;
use crate::error::{Error, Result};
use crate::types::{DateRange, JobId, RawMessage};

/// One completed download
///
/// Handed out as `Arc<Job>`; nothing mutates a job after the store inserts it.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Lookup key
    pub id: JobId,
    /// Slack user the messages belong to
    pub owner_user_id: String,
    /// Window passed to the message source
    pub requested_range: DateRange,
    /// Messages exactly as the source returned them, in source order
    pub raw_messages: Vec<RawMessage>,
    /// Creation time, used for expiry
    pub created_at: DateTime<Utc>,
}

/// Process-scoped store of download jobs
pub struct JobStore {
    jobs: ExpiringMap<JobId, Job>,
}

impl JobStore {
    /// Create an empty store; `ttl = None` keeps jobs for the process lifetime
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            jobs: ExpiringMap::new(ttl),
        }
    }

    /// Configured retention window
    pub fn ttl(&self) -> Option<Duration> {
        self.jobs.ttl()
    }

    /// Store a new immutable job and return its freshly generated id
    pub async fn create(
        &self,
        owner_user_id: impl Into<String>,
        requested_range: DateRange,
        raw_messages: Vec<RawMessage>,
    ) -> JobId {
        let job = Job {
            id: JobId::generate(),
            owner_user_id: owner_user_id.into(),
            requested_range,
            raw_messages,
            created_at: Utc::now(),
        };
        self.insert(job).await.id.clone()
    }

    pub(crate) async fn insert(&self, job: Job) -> Arc<Job> {
        let id = job.id.clone();
        let created_at = job.created_at;
        let message_count = job.raw_messages.len();
        let job = self.jobs.insert(id, job, created_at).await;
        tracing::info!(
            job_id = %job.id,
            user_id = %job.owner_user_id,
            range = %job.requested_range,
            message_count,
            "stored download job"
        );
        job
    }

    /// Fetch a job, failing with [`Error::JobNotFound`] if unknown or expired
    pub async fn get(&self, id: &JobId) -> Result<Arc<Job>> {
        self.jobs.get(id, Utc::now()).await.ok_or_else(|| {
            tracing::debug!(job_id = %id, "job lookup missed");
            Error::JobNotFound { id: id.to_string() }
        })
    }

    /// Number of live jobs
    pub async fn len(&self) -> usize {
        self.jobs.live_count(Utc::now()).await
    }

    /// Whether the store holds no live jobs
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every job
    pub async fn clear(&self) {
        self.jobs.clear().await;
        tracing::info!("cleared job store");
    }
}
