// crates/veridoc-server/src/audit.rs
// ============================================================================
// Module: Server Audit Logging
// Description: Structured audit events for upload request handling.
// Purpose: Emit redacted audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for upload request
//! logging. It is intentionally lightweight so deployments can route
//! events to their preferred logging pipeline without redesign. Events
//! carry sizes, outcomes, and latencies, never document bytes or
//! extracted text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit event for one analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Identifying filename supplied by the client.
    pub filename: String,
    /// Declared media type, when present.
    pub media_type: Option<String>,
    /// Upload size in bytes.
    pub request_bytes: usize,
    /// HTTP status code of the response.
    pub status: u16,
    /// Final classification label, when a verdict was produced.
    pub classification: Option<&'static str>,
    /// Request latency in milliseconds.
    pub latency_ms: u128,
    /// Redaction classification for payload logging.
    pub redaction: &'static str,
}

impl AnalyzeAuditEvent {
    /// Returns the current timestamp in milliseconds since epoch.
    #[must_use]
    pub fn now_ms() -> u128 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |duration| duration.as_millis())
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink for analysis audit events.
pub trait AuditSink: Send + Sync {
    /// Records one audit event.
    fn record(&self, event: &AnalyzeAuditEvent);
}

/// Audit sink writing JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AnalyzeAuditEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        }
    }
}

/// Audit sink discarding all events (tests and embedded use).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AnalyzeAuditEvent) {}
}
