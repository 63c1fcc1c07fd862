// crates/veridoc-providers/src/lib.rs
// ============================================================================
// Module: Veridoc Providers Library
// Description: Collaborator implementations for the analysis pipeline.
// Purpose: Supply extraction, prompting, and reasoning-transport backends.
// Dependencies: veridoc-core, reqwest, base64
// ============================================================================

//! ## Overview
//! Providers implement the core collaborator interfaces: content
//! extraction, forensics prompt construction, and the blocking HTTP client
//! for the generative-language reasoning service. All decision logic stays
//! in `veridoc-core`; providers are mechanical plumbing with strict
//! transport limits.
//!
//! Security posture: uploaded bytes and service responses are untrusted;
//! requests enforce timeouts, disabled redirects, and bounded reads.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod extract;
pub mod prompt;
pub mod reasoning;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use extract::MetadataExtractor;
pub use extract::SidecarTextExtractor;
pub use extract::Utf8TextExtractor;
pub use prompt::ForensicsPromptBuilder;
pub use reasoning::GenerativeLanguageClient;
pub use reasoning::ReasoningClientConfig;
