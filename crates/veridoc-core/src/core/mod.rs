// crates/veridoc-core/src/core/mod.rs
// ============================================================================
// Module: Veridoc Core Types
// Description: Verdict data model shared across decoding, validation, and rules.
// Purpose: Group core type modules and re-export the public model.
// Dependencies: crate::core::verdict
// ============================================================================

//! ## Overview
//! Core types for document forgery verdicts: the bounded classification
//! vocabulary, clamped confidence scores, evidence items, and the
//! sub-assessments produced by the reasoning service.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use verdict::Classification;
pub use verdict::Confidence;
pub use verdict::EvidenceItem;
pub use verdict::EvidenceTier;
pub use verdict::LogicalAssessment;
pub use verdict::Severity;
pub use verdict::Verdict;
pub use verdict::VisualAssessment;
