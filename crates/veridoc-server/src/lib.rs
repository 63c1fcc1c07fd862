// crates/veridoc-server/src/lib.rs
// ============================================================================
// Module: Veridoc Server Library
// Description: HTTP upload endpoint for document forgery analysis.
// Purpose: Expose the analysis pipeline over axum with audit logging.
// Dependencies: veridoc-core, veridoc-config, veridoc-providers, axum, tokio
// ============================================================================

//! ## Overview
//! The server exposes one health route and one analysis route. Uploaded
//! bytes plus a declared media type run through the synchronous pipeline
//! on a blocking task; the response carries an identifying filename and
//! the reconciled verdict. Input and transport failures map to error
//! envelopes; the pipeline is all-or-nothing per request and a
//! partially-reconciled verdict is never returned.
//!
//! Security posture: uploads are untrusted; body size is bounded before
//! any processing and audit events never carry document bytes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AnalyzeAuditEvent;
pub use audit::AuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use server::AnalyzeServer;
pub use server::ServerError;
