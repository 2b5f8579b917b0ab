//! Configuration types for slack-dm-export

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};

use crate::error::{Error, Result};

/// Slack Web API access used by the message source
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Bot token (xoxb-...) used as a bearer token
    #[serde(default)]
    pub bot_token: String,

    /// Base URL of the Slack Web API (default: "https://slack.com/api")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout applied to each HTTP call (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Page size for cursor-paginated calls (default: 200)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Conversation types passed to users.conversations
    /// (default: "im,mpim,public_channel,private_channel")
    #[serde(default = "default_conversation_types")]
    pub conversation_types: String,

    /// Look up a permalink for every downloaded message (default: true)
    #[serde(default = "default_true")]
    pub include_permalinks: bool,

    /// Also download the user's replies inside threads (default: true)
    #[serde(default = "default_true")]
    pub include_thread_replies: bool,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_api_base_url(),
            request_timeout: default_request_timeout(),
            page_size: default_page_size(),
            conversation_types: default_conversation_types(),
            include_permalinks: true,
            include_thread_replies: true,
        }
    }
}

/// How long jobs and rendered outputs stay reachable
///
/// Both stores live in process memory only. `None` keeps entries until the
/// process exits or the store is cleared.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Time-to-live for download jobs (default: 24 hours)
    #[serde(default = "default_ttl", with = "optional_duration_serde")]
    pub job_ttl: Option<Duration>,

    /// Time-to-live for rendered extract outputs (default: 24 hours)
    #[serde(default = "default_ttl", with = "optional_duration_serde")]
    pub output_ttl: Option<Duration>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            job_ttl: default_ttl(),
            output_ttl: default_ttl(),
        }
    }
}

/// Extract rendering options
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Number of rendered entries echoed back in the extract response (default: 10)
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            preview_limit: default_preview_limit(),
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:8000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Shared secret expected in the X-API-Password header
    ///
    /// When unset, every route is reachable without a password.
    #[serde(default)]
    pub api_password: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_password: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Slack Web API access
    #[serde(default)]
    pub slack: SlackConfig,

    /// Job and output retention
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Extract rendering options
    #[serde(default)]
    pub export: ExportConfig,

    /// API and external server integration
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Build a configuration from environment variables
    ///
    /// Recognized variables:
    /// - `SLACK_BOT_TOKEN` (required)
    /// - `API_PASSWORD` (required)
    /// - `BIND_ADDRESS` (default `0.0.0.0:8000`)
    /// - `SLACK_API_BASE_URL`
    /// - `JOB_TTL_SECS`, `OUTPUT_TTL_SECS` (`0` disables expiry)
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        config.slack.bot_token = required_env("SLACK_BOT_TOKEN")?;
        config.server.api.api_password = Some(required_env("API_PASSWORD")?);

        if let Some(url) = optional_env("SLACK_API_BASE_URL") {
            config.slack.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(addr) = optional_env("BIND_ADDRESS") {
            config.server.api.bind_address = addr.parse().map_err(|e| Error::Config {
                message: format!("invalid bind address '{addr}': {e}"),
                key: Some("BIND_ADDRESS".into()),
            })?;
        }

        if let Some(ttl) = ttl_env("JOB_TTL_SECS")? {
            config.retention.job_ttl = ttl;
        }
        if let Some(ttl) = ttl_env("OUTPUT_TTL_SECS")? {
            config.retention.output_ttl = ttl;
        }

        Ok(config)
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_env(key: &str) -> Result<String> {
    optional_env(key).ok_or_else(|| Error::Config {
        message: format!("{key} is missing in environment variables"),
        key: Some(key.into()),
    })
}

/// `Some(None)` when the variable is `0` (no expiry), `None` when unset
fn ttl_env(key: &str) -> Result<Option<Option<Duration>>> {
    let Some(raw) = optional_env(key) else {
        return Ok(None);
    };
    let secs: u64 = raw.parse().map_err(|e| Error::Config {
        message: format!("invalid {key} '{raw}': {e}"),
        key: Some(key.into()),
    })?;
    Ok(Some((secs > 0).then(|| Duration::from_secs(secs))))
}

fn default_api_base_url() -> String {
    "https://slack.com/api".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_page_size() -> u32 {
    200
}

fn default_conversation_types() -> String {
    "im,mpim,public_channel,private_channel".into()
}

fn default_ttl() -> Option<Duration> {
    Some(Duration::from_secs(24 * 60 * 60))
}

fn default_preview_limit() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
