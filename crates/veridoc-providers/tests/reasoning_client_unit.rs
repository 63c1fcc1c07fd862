// crates/veridoc-providers/tests/reasoning_client_unit.rs
// ============================================================================
// Module: Reasoning Client Unit Tests
// Description: Envelope handling and transport limits for the client.
// Purpose: Ensure candidate extraction, status mapping, and bounded reads.
// Dependencies: veridoc-providers, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Exercises the reasoning client against a local `tiny_http` server:
//! candidate text extraction, non-success status classification, malformed
//! envelopes, and the response size bound. The server may lie or stall;
//! the client must fail closed.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;

use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;
use veridoc_core::DocumentPart;
use veridoc_core::ReasoningClient;
use veridoc_core::ReasoningRequest;
use veridoc_core::TransportError;
use veridoc_providers::GenerativeLanguageClient;
use veridoc_providers::ReasoningClientConfig;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Starts a one-shot server returning the given status and body.
fn one_shot_server(status: u16, body: String) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base = format!("http://{addr}");
    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });
    base
}

/// Creates a client bound to the local server.
fn local_client(base_url: String, max_response_bytes: usize) -> GenerativeLanguageClient {
    GenerativeLanguageClient::new(ReasoningClientConfig {
        base_url,
        model: "test-model".to_string(),
        api_key: "test-key".to_string(),
        timeout_ms: 5_000,
        max_response_bytes,
        ..ReasoningClientConfig::default()
    })
    .unwrap()
}

/// Minimal document request fixture.
fn sample_request() -> ReasoningRequest {
    ReasoningRequest {
        prompt: "analyze".to_string(),
        document: DocumentPart {
            media_type: "application/pdf".to_string(),
            bytes: vec![0x25, 0x50, 0x44, 0x46],
        },
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn candidate_text_is_concatenated_across_parts() {
    let envelope = json!({
        "candidates": [{
            "content": {
                "parts": [
                    {"text": "{\"classification\":\"ORIGINAL\","},
                    {"text": "\"confidence\":90,\"summary\":\"s\"}"}
                ]
            }
        }]
    });
    let base = one_shot_server(200, envelope.to_string());
    let client = local_client(base, 1024 * 1024);
    let raw = client.invoke(&sample_request()).unwrap();
    assert!(raw.starts_with('{'));
    assert!(raw.contains("\"confidence\":90"));
}

#[test]
fn non_success_status_is_a_status_error() {
    let base = one_shot_server(503, "overloaded".to_string());
    let client = local_client(base, 1024 * 1024);
    let err = client.invoke(&sample_request()).unwrap_err();
    assert!(matches!(
        err,
        TransportError::Status {
            status: 503
        }
    ));
}

#[test]
fn envelope_without_candidates_is_malformed() {
    let base = one_shot_server(200, json!({"promptFeedback": {}}).to_string());
    let client = local_client(base, 1024 * 1024);
    let err = client.invoke(&sample_request()).unwrap_err();
    assert!(matches!(err, TransportError::MalformedEnvelope(_)));
}

#[test]
fn non_json_body_is_malformed() {
    let base = one_shot_server(200, "<html>proxy error</html>".to_string());
    let client = local_client(base, 1024 * 1024);
    let err = client.invoke(&sample_request()).unwrap_err();
    assert!(matches!(err, TransportError::MalformedEnvelope(_)));
}

#[test]
fn oversized_body_fails_closed() {
    let envelope = json!({
        "candidates": [{
            "content": {"parts": [{"text": "x".repeat(4096)}]}
        }]
    });
    let base = one_shot_server(200, envelope.to_string());
    let client = local_client(base, 256);
    let err = client.invoke(&sample_request()).unwrap_err();
    assert!(matches!(
        err,
        TransportError::ResponseTooLarge {
            limit: 256
        }
    ));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Port 9 (discard) is assumed closed.
    let client = local_client("http://127.0.0.1:9".to_string(), 1024);
    let err = client.invoke(&sample_request()).unwrap_err();
    assert!(matches!(err, TransportError::Unreachable(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn client_construction_succeeds_inside_an_async_runtime() {
    let client = GenerativeLanguageClient::new(ReasoningClientConfig {
        api_key: "test-key".to_string(),
        ..ReasoningClientConfig::default()
    });
    assert!(client.is_ok());
    // The blocking transport shuts down off the async workers.
    tokio::task::spawn_blocking(move || drop(client)).await.unwrap();
}
