// crates/veridoc-core/tests/response_decoding.rs
// ============================================================================
// Module: Response Decoding Tests
// Description: Validate payload location inside raw model output.
// Purpose: Ensure fenced, prose-wrapped, and bare payloads decode identically.
// Dependencies: veridoc-core
// ============================================================================

//! Decoder behavior tests for wrapped and degenerate model output.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    reason = "Test-only assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use veridoc_core::DecodeError;
use veridoc_core::decode_payload;

#[test]
fn bare_object_decodes_unchanged() -> Result<(), Box<dyn std::error::Error>> {
    let raw = r#"{"classification":"ORIGINAL","confidence":10}"#;
    assert_eq!(decode_payload(raw)?, raw);
    Ok(())
}

#[test]
fn fenced_payload_with_narrative_decodes_to_span() -> Result<(), Box<dyn std::error::Error>> {
    let raw = "Here is the result:\n```json\n{\"classification\":\"FORGED\",\"confidence\":95,\
               \"summary\":\"x\"}\n```\nThank you.";
    let span = decode_payload(raw)?;
    assert!(span.starts_with('{'));
    assert!(span.ends_with('}'));
    assert_eq!(
        span,
        "{\"classification\":\"FORGED\",\"confidence\":95,\"summary\":\"x\"}"
    );
    Ok(())
}

#[test]
fn fence_only_wrapping_is_stripped() -> Result<(), Box<dyn std::error::Error>> {
    let raw = "```json\n{\"classification\":\"ORIGINAL\"}\n```";
    assert_eq!(decode_payload(raw)?, "{\"classification\":\"ORIGINAL\"}");
    Ok(())
}

#[test]
fn span_runs_first_brace_to_last_brace() -> Result<(), Box<dyn std::error::Error>> {
    // Not brace-balanced by design: two objects collapse into one span.
    let raw = "noise {\"a\":1} middle {\"b\":2} noise";
    assert_eq!(decode_payload(raw)?, "{\"a\":1} middle {\"b\":2}");
    Ok(())
}

#[test]
fn missing_braces_is_a_decode_error() {
    let result = decode_payload("the model refused to answer");
    assert!(matches!(result, Err(DecodeError::NoPayload { .. })));
}

#[test]
fn decode_error_retains_raw_text_for_diagnostics() {
    let Err(DecodeError::NoPayload { raw }) = decode_payload("no payload here") else {
        panic!("expected NoPayload");
    };
    assert_eq!(raw, "no payload here");
}

#[test]
fn reversed_braces_do_not_decode() {
    assert!(decode_payload("} backwards {").is_err());
}
