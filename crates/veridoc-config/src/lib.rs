// crates/veridoc-config/src/lib.rs
// ============================================================================
// Module: Veridoc Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for veridoc.toml semantics.
// Dependencies: veridoc-core, serde, toml
// ============================================================================

//! ## Overview
//! `veridoc-config` defines the canonical configuration model for Veridoc.
//! It provides strict, fail-closed validation and a deterministic example
//! generator. Configuration carries the server surface, the reasoning
//! service endpoint, reconciliation thresholds, and the side-channel check
//! selection.
//!
//! Security posture: config inputs are untrusted; loading enforces hard
//! size limits and rejects out-of-bounds values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
