//! Exporters: turn a filtered batch of raw messages into output text
//!
//! An exporter is a pure function of its input. It never touches the job
//! or output stores; failures surface as [`Error::Render`](crate::Error::Render).

use crate::error::Result;
use crate::types::{ExportFormat, RawMessage};

mod json;
mod plain_text;

pub use json::JsonExporter;
pub use plain_text::PlainTextExporter;

/// Rendered form of a message batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedExport {
    /// One rendered entry per emitted message, in input order
    pub entries: Vec<String>,
    /// Full output body
    pub content: String,
}

/// Trait for rendering messages into one output format
pub trait Exporter: Send + Sync {
    /// Render `messages` in order
    ///
    /// # Errors
    /// Returns [`Error::Render`](crate::Error::Render) if a message cannot be rendered
    fn render(&self, messages: &[RawMessage]) -> Result<RenderedExport>;

    /// Format this exporter produces
    fn format(&self) -> ExportFormat;
}

/// Exporter for `format`
pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Text => Box::new(PlainTextExporter),
        ExportFormat::Json => Box::new(JsonExporter),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exporter_for_matches_requested_format() {
        assert_eq!(exporter_for(ExportFormat::Text).format(), ExportFormat::Text);
        assert_eq!(exporter_for(ExportFormat::Json).format(), ExportFormat::Json);
    }

    #[test]
    fn empty_batch_renders_empty_text() {
        let rendered = exporter_for(ExportFormat::Text).render(&[]).unwrap();
        assert_eq!(rendered, RenderedExport::default());
    }
}
