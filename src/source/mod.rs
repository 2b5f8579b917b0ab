//! Message sources: where raw messages come from
//!
//! A [`MessageSource`] performs one bounded fetch per download. It reports
//! failures as [`SourceError`] and never retries; retry is the caller's call.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{DateRange, RawMessage};

mod slack;

pub use slack::SlackMessageSource;

/// Trait for fetching a user's messages within an inclusive date range
///
/// # Examples
///
/// ```no_run
/// use slack_dm_export::config::SlackConfig;
/// use slack_dm_export::source::{MessageSource, SlackMessageSource};
/// use slack_dm_export::types::DateRange;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = SlackMessageSource::new(SlackConfig {
///     bot_token: "xoxb-...".into(),
///     ..Default::default()
/// })?;
///
/// let range = DateRange::parse("2025-03-07", "2025-03-09")?;
/// let messages = source.fetch_messages("U012AB3CD", &range).await?;
/// println!("fetched {} messages", messages.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch every message `user_id` wrote inside `range`, oldest first
    async fn fetch_messages(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> std::result::Result<Vec<RawMessage>, SourceError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
