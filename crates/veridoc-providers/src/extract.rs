// crates/veridoc-providers/src/extract.rs
// ============================================================================
// Module: Content Extractors
// Description: Content extractor implementations for the pipeline.
// Purpose: Provide metadata-only and UTF-8 passthrough extraction.
// Dependencies: veridoc-core
// ============================================================================

//! ## Overview
//! Extraction algorithms (OCR, page-text recovery) are external
//! collaborators; deployments plug their engine in behind
//! [`ContentExtractor`]. This module ships two baseline implementations:
//! [`MetadataExtractor`] treats documents as opaque and records descriptive
//! metadata only, since the multimodal reasoning service receives the raw
//! bytes regardless, and [`Utf8TextExtractor`] passes valid UTF-8 through
//! as side-channel text for deployments that extract upstream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use veridoc_core::ContentExtractor;
use veridoc_core::ExtractError;
use veridoc_core::ExtractedContent;

// ============================================================================
// SECTION: Metadata Extractor
// ============================================================================

/// Extractor for opaque documents: metadata only, no text.
///
/// # Invariants
/// - Never errors; emptiness of text is expected, not exceptional.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl ContentExtractor for MetadataExtractor {
    fn extract(&self, bytes: &[u8], media_type: &str) -> Result<ExtractedContent, ExtractError> {
        let mut metadata = BTreeMap::new();
        metadata.insert("media_type".to_string(), media_type.to_string());
        metadata.insert("size_bytes".to_string(), bytes.len().to_string());
        Ok(ExtractedContent {
            text: String::new(),
            metadata,
        })
    }
}

// ============================================================================
// SECTION: UTF-8 Passthrough Extractor
// ============================================================================

/// Extractor passing valid UTF-8 bytes through as side-channel text.
///
/// Suits deployments whose uploads are already text-bearing; invalid
/// UTF-8 degrades to metadata-only extraction rather than erroring.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8TextExtractor;

impl ContentExtractor for Utf8TextExtractor {
    fn extract(&self, bytes: &[u8], media_type: &str) -> Result<ExtractedContent, ExtractError> {
        let mut metadata = BTreeMap::new();
        metadata.insert("media_type".to_string(), media_type.to_string());
        metadata.insert("size_bytes".to_string(), bytes.len().to_string());
        let text = std::str::from_utf8(bytes).map(ToString::to_string).unwrap_or_default();
        Ok(ExtractedContent {
            text,
            metadata,
        })
    }
}

// ============================================================================
// SECTION: Sidecar Extractor
// ============================================================================

/// Extractor returning caller-supplied sidecar text for any document.
///
/// Deployments that run OCR upstream hand the recovered text in here so
/// the side-channel checks see it while the document bytes still travel
/// to the reasoning service untouched.
#[derive(Debug, Clone, Default)]
pub struct SidecarTextExtractor {
    /// Text recovered upstream of this service.
    text: String,
}

impl SidecarTextExtractor {
    /// Creates an extractor that reports the given sidecar text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
        }
    }
}

impl ContentExtractor for SidecarTextExtractor {
    fn extract(&self, bytes: &[u8], media_type: &str) -> Result<ExtractedContent, ExtractError> {
        let mut metadata = BTreeMap::new();
        metadata.insert("media_type".to_string(), media_type.to_string());
        metadata.insert("size_bytes".to_string(), bytes.len().to_string());
        Ok(ExtractedContent {
            text: self.text.clone(),
            metadata,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use veridoc_core::ContentExtractor;

    use super::MetadataExtractor;
    use super::SidecarTextExtractor;
    use super::Utf8TextExtractor;

    #[test]
    fn metadata_extractor_records_size_and_media_type() {
        let content = MetadataExtractor.extract(b"%PDF-1.4", "application/pdf").unwrap();
        assert!(content.text.is_empty());
        assert_eq!(content.metadata.get("media_type").map(String::as_str), Some("application/pdf"));
        assert_eq!(content.metadata.get("size_bytes").map(String::as_str), Some("8"));
    }

    #[test]
    fn utf8_extractor_passes_valid_text_through() {
        let content = Utf8TextExtractor.extract("Invoice May 2024".as_bytes(), "image/png").unwrap();
        assert_eq!(content.text, "Invoice May 2024");
    }

    #[test]
    fn utf8_extractor_degrades_to_empty_text_on_invalid_bytes() {
        let content = Utf8TextExtractor.extract(&[0xFF, 0xFE, 0x80], "image/png").unwrap();
        assert!(content.text.is_empty());
        assert_eq!(content.metadata.get("size_bytes").map(String::as_str), Some("3"));
    }

    #[test]
    fn sidecar_extractor_reports_supplied_text_for_any_document() {
        let extractor = SidecarTextExtractor::new("Total 2,350.00");
        let content = extractor.extract(b"\x89PNG", "image/png").unwrap();
        assert_eq!(content.text, "Total 2,350.00");
    }
}
