//! Core types for slack-dm-export

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Declares an opaque random token type used as a store key.
///
/// Tokens are 128 random bits rendered as 32 lowercase hex characters.
/// Uniqueness comes from entropy alone; stores never probe for collisions.
macro_rules! random_token_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(format!("{:032x}", rand::random::<u128>()))
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

random_token_id!(
    /// Unique identifier for a download job
    JobId
);

random_token_id!(
    /// Unique identifier (output handle) for a rendered extract
    OutputId
);

/// Parse a `YYYY-MM-DD` calendar date, naming the offending field on failure
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        Error::InvalidRequest(format!(
            "invalid {field} '{value}': expected YYYY-MM-DD ({e})"
        ))
    })
}

/// Inclusive calendar date window, interpreted in UTC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    /// First day included in the window
    pub start: NaiveDate,
    /// Last day included in the window
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRequest(format!(
                "start_date {start} is after end_date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date("start_date", start)?, parse_date("end_date", end)?)
    }

    /// Whether `date` falls inside the window (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The overlapping part of two windows, if any
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateRange { start, end })
    }

    /// Unix seconds at 00:00 UTC on the first day
    pub fn oldest_timestamp(&self) -> i64 {
        midnight_utc(self.start)
    }

    /// Unix seconds at 00:00 UTC on the day after the last day
    pub fn latest_timestamp(&self) -> i64 {
        let next = self.end.checked_add_days(Days::new(1)).unwrap_or(self.end);
        midnight_utc(next)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// A Slack message record as produced by the message source.
///
/// The typed fields cover what the exporters read. Anything else Slack sent
/// is kept in `extra` so the record serializes back out unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Slack timestamp (`"<seconds>.<micros>"`), also the message id within a channel
    #[serde(default)]
    pub ts: String,

    /// Message text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Author's user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Message subtype (e.g., "channel_join")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    /// Parent thread timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,

    /// Number of replies when this message starts a thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u32>,

    /// Conversation id, attached by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Conversation name, attached by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,

    /// Conversation topic, attached by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_topic: Option<String>,

    /// Conversation purpose, attached by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_purpose: Option<String>,

    /// Permanent link to the message, attached by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,

    /// Every other field Slack returned
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawMessage {
    /// Parse `ts` into a UTC timestamp without going through floating point
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let (secs, frac) = match self.ts.split_once('.') {
            Some((secs, frac)) => (secs, frac),
            None => (self.ts.as_str(), ""),
        };
        let secs: i64 = secs.parse().ok()?;
        let micros: u32 = if frac.is_empty() {
            0
        } else {
            let digits: String = frac.chars().take(6).collect();
            format!("{digits:0<6}").parse().ok()?
        };
        DateTime::from_timestamp(secs, micros * 1_000)
    }

    /// UTC calendar date of the message
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.date_naive())
    }
}

/// Outcome marker carried by successful responses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// The operation completed
    #[default]
    Success,
}

/// Output format for an extract
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Human-readable text, one block per message
    #[default]
    Text,
    /// Pretty-printed JSON array of the raw messages
    Json,
}

impl ExportFormat {
    /// File extension used for downloads
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }

    /// MIME type served for this format
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

/// Request body for POST /download
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Slack user id to download messages for
    pub user_id: String,
    /// Start date in YYYY-MM-DD format
    pub start_date: String,
    /// End date in YYYY-MM-DD format (inclusive)
    pub end_date: String,
}

/// Response for POST /download
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadResponse {
    /// Always "success"
    pub status: OperationStatus,
    /// Number of messages stored in the job
    pub message_count: usize,
    /// Identifier to pass to /extract
    pub job_id: JobId,
    /// Where the job lives (`memory://<job_id>`)
    pub download_location: String,
}

/// Request body for POST /extract
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ExtractRequest {
    /// Job id from a previous download
    pub job_id: String,
    /// Optional narrower start date (YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Optional narrower end date (YYYY-MM-DD)
    #[serde(default)]
    pub end_date: Option<String>,
    /// Output format (default: text)
    #[serde(default)]
    pub format: ExportFormat,
}

/// Response for POST /extract
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractResponse {
    /// Always "success"
    pub status: OperationStatus,
    /// Number of stored messages inside the effective window
    pub extracted_message_count: usize,
    /// Number of entries the exporter emitted
    pub rendered_message_count: usize,
    /// Handle for GET /files/{output_id}
    pub output_id: OutputId,
    /// URL to download the rendered output as a file
    pub output_file_url: String,
    /// URL to read the rendered output inline
    pub output_content_url: String,
    /// First few rendered entries
    pub messages: Vec<String>,
}

/// Response for GET /health
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Crate version
    pub version: String,
}
