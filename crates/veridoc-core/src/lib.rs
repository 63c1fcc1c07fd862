// crates/veridoc-core/src/lib.rs
// ============================================================================
// Module: Veridoc Core Library
// Description: Public API surface for the Veridoc analysis core.
// Purpose: Expose verdict types, collaborator interfaces, and the pipeline.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Veridoc core turns the unstructured answer of a multimodal reasoning
//! service into a decisive, well-typed document verdict. The reasoning
//! service's own classification is advisory: the reconciliation engine
//! re-derives the authoritative classification from structured evidence
//! through a fixed, auditable rule order. Extraction, prompting, and
//! transport integrate through explicit interfaces rather than being
//! embedded here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ContentExtractor;
pub use interfaces::DocumentPart;
pub use interfaces::ExtractError;
pub use interfaces::ExtractedContent;
pub use interfaces::InputError;
pub use interfaces::ReasoningClient;
pub use interfaces::ReasoningRequest;
pub use interfaces::RequestBuilder;
pub use interfaces::TransportError;
pub use runtime::AnalysisPipeline;
pub use runtime::DecodeError;
pub use runtime::PipelineError;
pub use runtime::ReconcilePolicy;
pub use runtime::SchemaError;
pub use runtime::SideChannelCheck;
pub use runtime::SideChannelFinding;
pub use runtime::decode_payload;
pub use runtime::default_side_channel_checks;
pub use runtime::fallback_verdict;
pub use runtime::reconcile;
pub use runtime::validate_payload;
