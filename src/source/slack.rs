//! Slack Web API message source

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::MessageSource;
use crate::config::SlackConfig;
use crate::error::{Error, Result, SourceError};
use crate::types::{DateRange, RawMessage};

/// Upper bound on pages followed for a single cursor-paginated call
const MAX_PAGES: usize = 100;

/// Error codes that mean the token itself is unusable
const TOKEN_ERRORS: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "token_revoked",
    "token_expired",
    "account_inactive",
];

/// Error codes that only affect one conversation
const SKIPPABLE_CHANNEL_ERRORS: &[&str] = &["channel_not_found", "not_in_channel"];

/// Conversation metadata attached to every message fetched from it
#[derive(Debug, Clone, Deserialize)]
struct Conversation {
    id: String,
    #[serde(default)]
    name: Option<String>,
    /// Counterpart user of a direct message
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    topic: Option<TextField>,
    #[serde(default)]
    purpose: Option<TextField>,
}

#[derive(Debug, Clone, Deserialize)]
struct TextField {
    #[serde(default)]
    value: String,
}

impl Conversation {
    fn display_name(&self) -> String {
        match (&self.name, &self.user) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(user)) => format!("dm-{user}"),
            _ => self.id.clone(),
        }
    }

    fn decorate(&self, message: &mut RawMessage) {
        message.channel = Some(self.id.clone());
        message.channel_name = Some(self.display_name());
        message.channel_topic = non_empty(self.topic.as_ref());
        message.channel_purpose = non_empty(self.purpose.as_ref());
    }
}

fn non_empty(field: Option<&TextField>) -> Option<String> {
    field
        .map(|f| f.value.trim())
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// [`MessageSource`] backed by the Slack Web API
///
/// One `fetch_messages` call is a single bounded pass: verify the token,
/// list the user's conversations, then page through each conversation's
/// history. Nothing is retried.
pub struct SlackMessageSource {
    http_client: reqwest::Client,
    config: SlackConfig,
}

impl SlackMessageSource {
    /// Create a source from Slack settings
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the token is empty or the HTTP client
    /// cannot be created
    pub fn new(config: SlackConfig) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(Error::Config {
                message: "Slack bot token must not be empty".to_string(),
                key: Some("SLACK_BOT_TOKEN".to_string()),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("slack-dm-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
                key: None,
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Call one Web API method and return the body of an `ok: true` response
    async fn call(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<Value, SourceError> {
        let url = format!(
            "{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            method
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.bot_token)
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Network {
                method: method.to_string(),
                reason: if e.is_timeout() {
                    format!("timed out after {:?}", self.config.request_timeout)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            tracing::warn!(method, ?retry_after_secs, "Slack rate limit hit");
            return Err(SourceError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(SourceError::Api {
                method: method.to_string(),
                code: format!("http_{}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| SourceError::Network {
            method: method.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;
        let data: Value =
            serde_json::from_str(&body).map_err(|e| SourceError::MalformedResponse {
                method: method.to_string(),
                reason: format!("response is not valid JSON: {e}"),
            })?;

        match data.get("ok").and_then(Value::as_bool) {
            Some(true) => Ok(data),
            Some(false) => Err(classify_error(method, &data)),
            None => Err(SourceError::MalformedResponse {
                method: method.to_string(),
                reason: "missing `ok` field".to_string(),
            }),
        }
    }

    /// Follow `response_metadata.next_cursor` and collect `field` from every page
    async fn paginate(
        &self,
        method: &str,
        params: Vec<(&str, String)>,
        field: &str,
    ) -> std::result::Result<Vec<Value>, SourceError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            pages += 1;
            let mut page_params = params.clone();
            page_params.push(("limit", self.config.page_size.to_string()));
            if let Some(ref next) = cursor {
                page_params.push(("cursor", next.clone()));
            }

            let mut data = self.call(method, &page_params).await?;
            match data.get_mut(field).map(Value::take) {
                Some(Value::Array(page)) => items.extend(page),
                Some(Value::Null) | None => {}
                Some(_) => {
                    return Err(SourceError::MalformedResponse {
                        method: method.to_string(),
                        reason: format!("`{field}` is not an array"),
                    });
                }
            }

            cursor = next_cursor(&data);
            if cursor.is_none() {
                break;
            }
            if pages >= MAX_PAGES {
                tracing::warn!(
                    method,
                    pages = MAX_PAGES,
                    "reached page limit; results may be incomplete"
                );
                break;
            }
        }

        Ok(items)
    }

    async fn list_conversations(
        &self,
        user_id: &str,
    ) -> std::result::Result<Vec<Conversation>, SourceError> {
        let params = vec![
            ("user", user_id.to_string()),
            ("types", self.config.conversation_types.clone()),
        ];
        let raw = self
            .paginate("users.conversations", params, "channels")
            .await?;
        parse_items("users.conversations", raw)
    }

    /// Page through one conversation's history; `None` means the
    /// conversation is not readable and was skipped
    async fn history(
        &self,
        conversation: &Conversation,
        range: &DateRange,
    ) -> std::result::Result<Option<Vec<RawMessage>>, SourceError> {
        let params = vec![
            ("channel", conversation.id.clone()),
            ("oldest", range.oldest_timestamp().to_string()),
            ("latest", range.latest_timestamp().to_string()),
        ];
        match self
            .paginate("conversations.history", params, "messages")
            .await
        {
            Ok(raw) => parse_items("conversations.history", raw).map(Some),
            Err(SourceError::Api { code, .. })
                if SKIPPABLE_CHANNEL_ERRORS.contains(&code.as_str()) =>
            {
                tracing::warn!(
                    channel = %conversation.id,
                    code = %code,
                    "skipping unreadable conversation"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn thread_replies(
        &self,
        channel_id: &str,
        thread_ts: &str,
    ) -> std::result::Result<Vec<RawMessage>, SourceError> {
        let params = vec![
            ("channel", channel_id.to_string()),
            ("ts", thread_ts.to_string()),
        ];
        let raw = self
            .paginate("conversations.replies", params, "messages")
            .await?;
        parse_items("conversations.replies", raw)
    }

    /// Best effort; any failure leaves the message without a link
    async fn permalink(&self, channel_id: &str, ts: &str) -> Option<String> {
        let params = [
            ("channel", channel_id.to_string()),
            ("message_ts", ts.to_string()),
        ];
        match self.call("chat.getPermalink", &params).await {
            Ok(data) => data
                .get("permalink")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
            Err(e) => {
                tracing::debug!(channel = channel_id, ts, error = %e, "no permalink");
                None
            }
        }
    }
}

#[async_trait]
impl MessageSource for SlackMessageSource {
    async fn fetch_messages(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> std::result::Result<Vec<RawMessage>, SourceError> {
        self.call("auth.test", &[]).await?;

        let conversations = self.list_conversations(user_id).await?;
        tracing::debug!(
            user_id,
            conversations = conversations.len(),
            "listed conversations"
        );

        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut messages = Vec::new();

        for conversation in &conversations {
            let Some(history) = self.history(conversation, range).await? else {
                continue;
            };

            for message in history {
                if message.user.as_deref() != Some(user_id) {
                    // Thread parents started by others can still hold the user's replies
                    if !self.wants_replies(&message) {
                        continue;
                    }
                } else if seen.insert((conversation.id.clone(), message.ts.clone())) {
                    let mut message = message.clone();
                    conversation.decorate(&mut message);
                    messages.push(message);
                }

                if self.wants_replies(&message) {
                    let replies = self.thread_replies(&conversation.id, &message.ts).await?;
                    for mut reply in replies {
                        if reply.ts == message.ts
                            || reply.user.as_deref() != Some(user_id)
                            || !reply.date().is_some_and(|d| range.contains(d))
                        {
                            continue;
                        }
                        if seen.insert((conversation.id.clone(), reply.ts.clone())) {
                            conversation.decorate(&mut reply);
                            messages.push(reply);
                        }
                    }
                }
            }
        }

        if self.config.include_permalinks {
            for message in &mut messages {
                if let Some(channel) = message.channel.clone() {
                    message.permalink = self.permalink(&channel, &message.ts).await;
                }
            }
        }

        messages.sort_by(|a, b| a.timestamp().cmp(&b.timestamp()).then_with(|| a.ts.cmp(&b.ts)));

        tracing::info!(
            user_id,
            range = %range,
            message_count = messages.len(),
            "fetched messages from Slack"
        );
        Ok(messages)
    }

    fn name(&self) -> &str {
        "slack"
    }
}

impl SlackMessageSource {
    fn wants_replies(&self, message: &RawMessage) -> bool {
        self.config.include_thread_replies && message.reply_count.is_some_and(|n| n > 0)
    }
}

fn classify_error(method: &str, data: &Value) -> SourceError {
    let code = data
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error");

    if TOKEN_ERRORS.contains(&code) {
        return SourceError::InvalidToken(code.to_string());
    }
    match code {
        "missing_scope" => SourceError::MissingScope {
            needed: data
                .get("needed")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        },
        "ratelimited" => SourceError::RateLimited {
            retry_after_secs: None,
        },
        _ => SourceError::Api {
            method: method.to_string(),
            code: code.to_string(),
        },
    }
}

fn next_cursor(data: &Value) -> Option<String> {
    data.get("response_metadata")
        .and_then(|rm| rm.get("next_cursor"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_items<T: serde::de::DeserializeOwned>(
    method: &str,
    raw: Vec<Value>,
) -> std::result::Result<Vec<T>, SourceError> {
    raw.into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| SourceError::MalformedResponse {
            method: method.to_string(),
            reason: e.to_string(),
        })
}
