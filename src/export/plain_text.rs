//! Human-readable text export

use super::{Exporter, RenderedExport};
use crate::error::{Error, Result};
use crate::types::{ExportFormat, RawMessage};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders one block per message:
///
/// ```text
/// [Channel: #general]
/// Topic: Company news
/// Date: 2025-03-08 00:00:00
/// Link: https://example.slack.com/archives/C1/p1741392000000100
/// Message: hello
/// ```
///
/// Join notices and messages without text are skipped. Every block is
/// followed by a blank line. Dates are UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExporter;

impl PlainTextExporter {
    fn render_one(message: &RawMessage) -> Result<String> {
        let mut out = String::new();

        if let Some(channel) = message.channel_name.as_ref().or(message.channel.as_ref()) {
            out.push_str(&format!("[Channel: #{channel}]\n"));
            if let Some(topic) = &message.channel_topic {
                out.push_str(&format!("Topic: {topic}\n"));
            }
            if let Some(purpose) = &message.channel_purpose {
                out.push_str(&format!("Purpose: {purpose}\n"));
            }
        }

        if !message.ts.is_empty() {
            let timestamp = message.timestamp().ok_or_else(|| {
                Error::Render(format!("message timestamp {:?} is not valid", message.ts))
            })?;
            out.push_str(&format!("Date: {}\n", timestamp.format(DATE_FORMAT)));
        }

        if let Some(link) = &message.permalink {
            out.push_str(&format!("Link: {link}\n"));
        }

        out.push_str("Message: ");
        out.push_str(message.text.as_deref().unwrap_or_default());
        Ok(out)
    }

    fn is_renderable(message: &RawMessage) -> bool {
        message.subtype.as_deref() != Some("channel_join")
            && message.text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl Exporter for PlainTextExporter {
    fn render(&self, messages: &[RawMessage]) -> Result<RenderedExport> {
        let entries = messages
            .iter()
            .filter(|m| Self::is_renderable(m))
            .map(Self::render_one)
            .collect::<Result<Vec<_>>>()?;

        let content = entries.iter().fold(String::new(), |mut acc, entry| {
            acc.push_str(entry);
            acc.push_str("\n\n");
            acc
        });

        Ok(RenderedExport { entries, content })
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }
}
