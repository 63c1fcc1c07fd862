// crates/veridoc-core/src/runtime/decode.rs
// ============================================================================
// Module: Veridoc Response Decoder
// Description: Locate the structured payload inside raw model output.
// Purpose: Strip narrative wrapping and return the embedded object span.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The reasoning service wraps its structured answer in narrative prose,
//! markdown fences, or both. The decoder strips known wrapping markers
//! defensively and then takes the span from the first `{` to the last `}`
//! as the candidate payload. The span scan is deliberately not
//! brace-balanced: it assumes exactly one top-level object and will
//! misparse a response carrying several independent objects. That
//! limitation is accepted, not special-cased.
//!
//! Decoding is a pure transform with no side effects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum raw-text length retained for diagnostics in decode errors.
const MAX_DIAGNOSTIC_LEN: usize = 512;

/// Fence markers stripped before the span scan.
const FENCE_MARKERS: &[&str] = &["```json", "```JSON", "```"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Decoder errors.
///
/// # Invariants
/// - The raw text is retained (truncated) for diagnostics.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No `{`..`}` span was found in the raw output.
    #[error("no structured payload found in model output: {raw}")]
    NoPayload {
        /// Truncated raw model output for diagnostics.
        raw: String,
    },
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Locates the single structured payload embedded in raw model output.
///
/// # Errors
///
/// Returns [`DecodeError::NoPayload`] when no `{`..`}` span exists.
pub fn decode_payload(raw: &str) -> Result<&str, DecodeError> {
    let stripped = strip_fences(raw);
    let start = stripped.find('{');
    let end = stripped.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&stripped[start..=end]),
        _ => Err(DecodeError::NoPayload {
            raw: truncate_for_diagnostics(raw),
        }),
    }
}

/// Strips markdown fence wrapping when the payload is fenced.
///
/// Only removes markers at trimmed line boundaries so braces inside the
/// payload are never touched.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    for marker in FENCE_MARKERS {
        if let Some(rest) = text.strip_prefix(marker) {
            text = rest.trim_start();
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// Truncates raw text to a bounded diagnostic string at a char boundary.
fn truncate_for_diagnostics(raw: &str) -> String {
    if raw.len() <= MAX_DIAGNOSTIC_LEN {
        return raw.to_string();
    }
    let mut cut = MAX_DIAGNOSTIC_LEN;
    while !raw.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &raw[..cut])
}
