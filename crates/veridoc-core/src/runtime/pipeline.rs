// crates/veridoc-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Veridoc Analysis Pipeline
// Description: Per-document extract/invoke/decode/validate/reconcile flow.
// Purpose: Compose collaborator interfaces with the core stages.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! One document is one synchronous pipeline run: extract, build the
//! request, invoke the reasoning service, decode, validate, reconcile.
//! Decode and schema failures recover locally into the fallback ERROR
//! verdict, so analysis requests return a best-effort typed answer. Input
//! and transport failures are fatal and surface as [`PipelineError`]; no
//! verdict is fabricated for them.
//!
//! The pipeline holds no mutable state and is safe to run concurrently
//! across documents. The reasoning-service invocation is the single
//! blocking point; callers bound it with a transport-level timeout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Verdict;
use crate::interfaces::ContentExtractor;
use crate::interfaces::DocumentPart;
use crate::interfaces::ExtractError;
use crate::interfaces::InputError;
use crate::interfaces::ReasoningClient;
use crate::interfaces::RequestBuilder;
use crate::interfaces::TransportError;
use crate::interfaces::is_supported_media;
use crate::runtime::decode::decode_payload;
use crate::runtime::reconcile::ReconcilePolicy;
use crate::runtime::reconcile::reconcile;
use crate::runtime::sidechannel::SideChannelCheck;
use crate::runtime::validate::fallback_verdict;
use crate::runtime::validate::validate_payload;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal pipeline errors surfaced to the caller.
///
/// # Invariants
/// - Decode and schema failures never appear here; they become the
///   fallback ERROR verdict instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Client input was rejected before the pipeline ran.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Content extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// The reasoning-service invocation failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Per-document analysis pipeline over pluggable collaborators.
///
/// # Invariants
/// - No state persists across `analyze` calls; each invocation is
///   at-most-once bookkeeping.
pub struct AnalysisPipeline<E, B, C> {
    /// Content extractor collaborator.
    extractor: E,
    /// Reasoning request builder collaborator.
    builder: B,
    /// Reasoning-service client collaborator.
    client: C,
    /// Reconciliation thresholds and vocabularies.
    policy: ReconcilePolicy,
    /// Ordered deterministic side-channel checks.
    checks: Vec<Box<dyn SideChannelCheck>>,
}

impl<E, B, C> AnalysisPipeline<E, B, C>
where
    E: ContentExtractor,
    B: RequestBuilder,
    C: ReasoningClient,
{
    /// Creates a pipeline from collaborators and reconciliation settings.
    #[must_use]
    pub fn new(
        extractor: E,
        builder: B,
        client: C,
        policy: ReconcilePolicy,
        checks: Vec<Box<dyn SideChannelCheck>>,
    ) -> Self {
        Self {
            extractor,
            builder,
            client,
            policy,
            checks,
        }
    }

    /// Analyzes one document and returns the authoritative verdict.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for empty content, unsupported media,
    /// extraction failure, or transport failure. Decode and schema
    /// failures are recovered into the fallback ERROR verdict.
    pub fn analyze(&self, bytes: &[u8], media_type: &str) -> Result<Verdict, PipelineError> {
        if bytes.is_empty() {
            return Err(InputError::EmptyContent.into());
        }
        if !is_supported_media(media_type) {
            return Err(InputError::UnsupportedMedia {
                media_type: media_type.to_string(),
            }
            .into());
        }

        let content = self.extractor.extract(bytes, media_type)?;
        let request = self.builder.build(
            &content,
            DocumentPart {
                media_type: media_type.to_string(),
                bytes: bytes.to_vec(),
            },
        );
        let raw = self.client.invoke(&request)?;

        let validated = match decode_payload(&raw) {
            Ok(span) => match validate_payload(span) {
                Ok(verdict) => verdict,
                Err(err) => return Ok(fallback_verdict(&err.to_string())),
            },
            Err(err) => return Ok(fallback_verdict(&err.to_string())),
        };

        let raw_text = (!content.text.is_empty()).then_some(content.text.as_str());
        Ok(reconcile(validated, raw_text, &self.policy, &self.checks))
    }
}
