//! JSON export of the raw messages

use super::{Exporter, RenderedExport};
use crate::error::{Error, Result};
use crate::types::{ExportFormat, RawMessage};

/// Renders the batch as a pretty-printed JSON array
///
/// Messages keep every field the source returned. Preview entries are the
/// compact JSON form of each message.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn render(&self, messages: &[RawMessage]) -> Result<RenderedExport> {
        let entries = messages
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Render(format!("failed to encode message: {e}")))?;

        let content = serde_json::to_string_pretty(messages)
            .map_err(|e| Error::Render(format!("failed to encode messages: {e}")))?;

        Ok(RenderedExport { entries, content })
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }
}
