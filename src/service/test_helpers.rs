//! Shared test helpers for creating ExportService instances in tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::Config;
use crate::error::SourceError;
use crate::service::ExportService;
use crate::source::MessageSource;
use crate::types::{DateRange, RawMessage};

/// Message source that answers from a fixed list instead of Slack
///
/// Messages are filtered by user and range the way Slack would, so
/// narrowing logic can be exercised against a realistic fetch.
pub(crate) struct StaticMessageSource {
    messages: Vec<RawMessage>,
    failure: Option<fn() -> SourceError>,
    calls: AtomicUsize,
}

impl StaticMessageSource {
    pub(crate) fn new(messages: Vec<RawMessage>) -> Self {
        Self {
            messages,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Source whose every fetch fails with the error `failure` builds
    pub(crate) fn failing(failure: fn() -> SourceError) -> Self {
        Self {
            messages: Vec::new(),
            failure: Some(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSource for StaticMessageSource {
    async fn fetch_messages(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<RawMessage>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(self
            .messages
            .iter()
            .filter(|m| m.user.as_deref() == Some(user_id))
            .filter(|m| m.date().is_some_and(|d| range.contains(d)))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Build a message from `user` at `ts` in #general
pub(crate) fn message(user: &str, ts: &str, text: &str) -> RawMessage {
    RawMessage {
        ts: ts.into(),
        text: Some(text.into()),
        user: Some(user.into()),
        channel: Some("C1".into()),
        channel_name: Some("general".into()),
        ..Default::default()
    }
}

/// One message per day from U123 on 2025-03-07, 08 (two) and 09, plus noise
/// from another user
pub(crate) fn sample_messages() -> Vec<RawMessage> {
    vec![
        message("U123", "1741305600.000100", "seventh"),
        message("U123", "1741392000.000100", "eighth morning"),
        message("U999", "1741392100.000100", "someone else"),
        message("U123", "1741435200.000100", "eighth noon"),
        message("U123", "1741478400.000100", "ninth"),
    ]
}

/// Create a service over `source` with default settings and a fixed test password
pub(crate) fn create_test_service_with(source: Arc<dyn MessageSource>) -> ExportService {
    let mut config = Config::default();
    config.server.api.api_password = Some("test-password".to_string());
    ExportService::new(config, source)
}

/// Create a service over [`sample_messages`]
pub(crate) fn create_test_service() -> (ExportService, Arc<StaticMessageSource>) {
    let source = Arc::new(StaticMessageSource::new(sample_messages()));
    let service = create_test_service_with(source.clone());
    (service, source)
}
