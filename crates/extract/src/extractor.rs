//! The extractor strategy interface.

use crate::{ExtractedCoordinate, Result};
use async_trait::async_trait;

/// Document content handed to every extractor.
#[derive(Debug, Clone)]
pub struct ExtractionInput {
    /// Owning document
    pub document_id: String,
    /// Raw bytes
    pub content: Vec<u8>,
    /// Content decoded as UTF-8, lossy
    pub text: String,
    /// Declared MIME type
    pub mime_type: Option<String>,
    /// Original file name
    pub filename: Option<String>,
    is_image: bool,
}

impl ExtractionInput {
    /// Wrap raw document bytes.
    pub fn new(
        document_id: impl Into<String>,
        content: Vec<u8>,
        mime_type: Option<String>,
        filename: Option<String>,
    ) -> Self {
        let declared_text = mime_type
            .as_deref()
            .is_some_and(|m| m.trim().to_ascii_lowercase().starts_with("text/"));
        let is_image = !declared_text
            && geotag_image::is_image(&content, mime_type.as_deref(), filename.as_deref());
        let text = if is_image {
            String::new()
        } else {
            String::from_utf8_lossy(&content).into_owned()
        };

        Self { document_id: document_id.into(), content, text, mime_type, filename, is_image }
    }

    /// Plain-text input, mostly for tests and callers that already hold text.
    pub fn from_text(document_id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            document_id: document_id.into(),
            content: text.as_bytes().to_vec(),
            text,
            mime_type: Some("text/plain".to_string()),
            filename: None,
            is_image: false,
        }
    }

    /// Image by MIME type, magic bytes or file extension.
    pub fn is_image(&self) -> bool {
        self.is_image
    }
}

/// One coordinate extraction strategy.
///
/// The orchestrator runs its extractors in order and isolates failures, so an
/// implementation may return errors freely.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short stable name for logs and metadata.
    fn name(&self) -> &'static str;

    /// Whether this strategy can handle the input at all.
    fn is_applicable(&self, input: &ExtractionInput) -> bool;

    /// Skipped unless the caller opts in (`use_ai`).
    fn requires_opt_in(&self) -> bool {
        false
    }

    /// Produce candidates.
    async fn extract(&self, input: &ExtractionInput) -> Result<Vec<ExtractedCoordinate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_input_is_not_image() {
        let input = ExtractionInput::from_text("d1", "GPS: 40.7128, -74.0060");
        assert!(!input.is_image());
        assert_eq!(input.text, "GPS: 40.7128, -74.0060");
    }

    #[test]
    fn test_declared_text_skips_magic_bytes() {
        let content = b"BMW parked at 40.7128, -74.0060".to_vec();
        let input = ExtractionInput::new("d3", content, Some("text/plain".into()), None);
        assert!(!input.is_image());
        assert!(input.text.starts_with("BMW"));
    }

    #[test]
    fn test_image_input_has_no_text() {
        let content = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00];
        let input = ExtractionInput::new("d2", content, None, Some("a.jpg".into()));
        assert!(input.is_image());
        assert!(input.text.is_empty());
    }
}
