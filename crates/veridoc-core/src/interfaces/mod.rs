// crates/veridoc-core/src/interfaces/mod.rs
// ============================================================================
// Module: Veridoc Interfaces
// Description: Backend-agnostic interfaces for extraction, prompting, and transport.
// Purpose: Define the contract surfaces used by the Veridoc analysis pipeline.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the analysis core integrates with external
//! collaborators without embedding backend-specific details: content
//! extraction, reasoning-request construction, and the reasoning-service
//! invocation. The core treats all three as mechanical plumbing; decision
//! logic lives entirely in [`crate::runtime`].
//!
//! Security posture: uploaded bytes and reasoning-service responses are
//! untrusted input and must be validated by implementations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

// ============================================================================
// SECTION: Input Classification
// ============================================================================

/// Client-input errors detected before the pipeline is invoked.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Input errors are fatal; no verdict is fabricated for them.
#[derive(Debug, Error)]
pub enum InputError {
    /// Uploaded content was empty.
    #[error("uploaded content is empty")]
    EmptyContent,
    /// Declared media type is not supported.
    #[error("unsupported media type: {media_type}")]
    UnsupportedMedia {
        /// The declared media type.
        media_type: String,
    },
}

/// Returns true when the declared media type is accepted by the pipeline.
///
/// Supported media: one rasterizable multi-page document format
/// (`application/pdf`) and direct image formats (`image/*`).
#[must_use]
pub fn is_supported_media(media_type: &str) -> bool {
    media_type == "application/pdf" || media_type.starts_with("image/")
}

// ============================================================================
// SECTION: Content Extractor
// ============================================================================

/// Extracted document content plus descriptive metadata.
///
/// # Invariants
/// - `text` may be empty for opaque formats; emptiness is not an error.
/// - Metadata keys are stable strings chosen by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Text recovered from the document, possibly empty.
    pub text: String,
    /// Descriptive metadata about the document.
    pub metadata: BTreeMap<String, String>,
}

/// Extraction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The extractor backend reported a failure.
    #[error("content extraction failed: {0}")]
    Backend(String),
}

/// Backend-agnostic content extractor.
///
/// Implementations convert document bytes into text plus metadata. OCR and
/// page-text engines are external collaborators behind this trait; the core
/// never inspects document bytes itself.
pub trait ContentExtractor {
    /// Extracts text and metadata from document bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] when the extractor backend fails. An opaque
    /// document yields empty text, not an error.
    fn extract(&self, bytes: &[u8], media_type: &str) -> Result<ExtractedContent, ExtractError>;
}

// ============================================================================
// SECTION: Request Builder
// ============================================================================

/// Document payload forwarded to the reasoning service.
///
/// # Invariants
/// - `bytes` are the original upload, unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPart {
    /// Declared media type of the document.
    pub media_type: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

/// Request payload for one reasoning-service invocation.
///
/// # Invariants
/// - `prompt` wording is configuration, not logic; the core never branches
///   on its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningRequest {
    /// Instruction prompt for the reasoning service.
    pub prompt: String,
    /// The document to analyze.
    pub document: DocumentPart,
}

/// Builds a reasoning request from extracted content and the document.
pub trait RequestBuilder {
    /// Builds the outbound request payload.
    fn build(&self, content: &ExtractedContent, document: DocumentPart) -> ReasoningRequest;
}

// ============================================================================
// SECTION: Reasoning Client
// ============================================================================

/// Transport errors from the reasoning-service invocation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Transport failures are fatal to the request; they are never converted
///   into a forgery verdict.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The service could not be reached.
    #[error("reasoning service unreachable: {0}")]
    Unreachable(String),
    /// The service answered with a non-success status.
    #[error("reasoning service returned status {status}")]
    Status {
        /// HTTP status code returned by the service.
        status: u16,
    },
    /// The response envelope did not carry a usable candidate.
    #[error("malformed reasoning response envelope: {0}")]
    MalformedEnvelope(String),
    /// The response body exceeded the configured size limit.
    #[error("reasoning response exceeded {limit} bytes")]
    ResponseTooLarge {
        /// Configured maximum response size in bytes.
        limit: usize,
    },
}

/// Backend-agnostic reasoning-service client.
///
/// One call is one at-most-once invocation; retry policies belong to
/// callers, never to implementations.
pub trait ReasoningClient {
    /// Submits a request and returns the raw textual model output.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service is unreachable, answers
    /// with a non-success status, or returns a malformed envelope.
    fn invoke(&self, request: &ReasoningRequest) -> Result<String, TransportError>;
}
