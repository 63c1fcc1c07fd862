// crates/veridoc-core/src/runtime/mod.rs
// ============================================================================
// Module: Veridoc Runtime
// Description: Decode, validate, and reconcile stages of the analysis core.
// Purpose: Group runtime modules and re-export the pipeline surface.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime holds the three core stages: response decoding (locate the
//! structured payload in raw model output), schema validation (coerce it
//! into a typed [`crate::core::Verdict`]), and evidence reconciliation
//! (re-derive the authoritative classification through an ordered rule
//! fold). [`pipeline`] composes the stages with the collaborator
//! interfaces into a per-document synchronous pipeline.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod decode;
pub mod pipeline;
pub mod reconcile;
pub mod sidechannel;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use decode::DecodeError;
pub use decode::decode_payload;
pub use pipeline::AnalysisPipeline;
pub use pipeline::PipelineError;
pub use reconcile::ReconcilePolicy;
pub use reconcile::reconcile;
pub use sidechannel::ConflictingPeriodCheck;
pub use sidechannel::SideChannelCheck;
pub use sidechannel::SideChannelFinding;
pub use sidechannel::UnmarkedAmountCheck;
pub use sidechannel::default_side_channel_checks;
pub use validate::SchemaError;
pub use validate::fallback_verdict;
pub use validate::validate_payload;
