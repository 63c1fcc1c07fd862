// crates/veridoc-providers/src/reasoning.rs
// ============================================================================
// Module: Generative-Language Reasoning Client
// Description: Blocking HTTP client for the multimodal reasoning service.
// Purpose: Submit document plus prompt and recover the raw model text.
// Dependencies: veridoc-core, reqwest, base64, serde_json
// ============================================================================

//! ## Overview
//! The reasoning client posts the document (inline base64) and the
//! forensic prompt to a generative-language `generateContent` endpoint and
//! returns the concatenated candidate text as raw model output. Transport
//! enforcement follows the provider discipline: full-lifecycle timeout,
//! redirects disabled, bounded response reads. A response schema rides
//! along with the request to bias the service toward parseable JSON; the
//! decoder downstream still assumes nothing about compliance.
//!
//! Security posture: service responses are untrusted; the envelope is
//! parsed defensively and oversized bodies fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use serde_json::json;
use veridoc_core::ReasoningClient;
use veridoc_core::ReasoningRequest;
use veridoc_core::TransportError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the reasoning client.
///
/// # Invariants
/// - `timeout_ms` applies to the full request lifecycle.
/// - `max_response_bytes` is a hard upper bound on response bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningClientConfig {
    /// Base URL of the generative-language endpoint.
    pub base_url: String,
    /// Model identifier appended to the URL path.
    pub model: String,
    /// API key sent with the request.
    pub api_key: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for ReasoningClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: String::new(),
            timeout_ms: 60_000,
            max_response_bytes: 1024 * 1024,
            temperature: 0.1,
            user_agent: "veridoc/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Response Schema
// ============================================================================

/// Structured-output schema sent alongside the request.
///
/// Biases the service toward the verdict shape; compliance is not assumed.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "visual_assessment": {
                "type": "OBJECT",
                "properties": {
                    "is_tampered": {"type": "BOOLEAN"},
                    "confidence_score": {"type": "INTEGER"},
                    "artifacts": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "quality_note": {"type": "STRING"}
                },
                "required": ["is_tampered", "confidence_score", "artifacts", "quality_note"]
            },
            "logical_assessment": {
                "type": "OBJECT",
                "properties": {
                    "has_contradictions": {"type": "BOOLEAN"},
                    "confidence_score": {"type": "INTEGER"},
                    "math_errors": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "date_issues": {"type": "ARRAY", "items": {"type": "STRING"}}
                },
                "required": ["has_contradictions", "confidence_score", "math_errors", "date_issues"]
            },
            "classification": {"type": "STRING"},
            "confidence": {"type": "INTEGER"},
            "summary": {"type": "STRING"},
            "reasoning": {"type": "STRING"}
        },
        "required": [
            "visual_assessment",
            "logical_assessment",
            "classification",
            "confidence",
            "summary"
        ]
    })
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking client for the generative-language reasoning service.
pub struct GenerativeLanguageClient {
    /// Client configuration, including limits.
    config: ReasoningClientConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl GenerativeLanguageClient {
    /// Creates a new reasoning client with the given configuration.
    ///
    /// The blocking HTTP client owns a private runtime and cannot be built
    /// on an async executor thread, so construction runs on a dedicated
    /// thread. Callers may therefore construct the client from any context.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the HTTP client cannot be created.
    pub fn new(config: ReasoningClientConfig) -> Result<Self, TransportError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let user_agent = config.user_agent.clone();
        let client = std::thread::Builder::new()
            .name("veridoc-client-init".to_string())
            .spawn(move || {
                Client::builder()
                    .timeout(timeout)
                    .user_agent(user_agent)
                    .redirect(Policy::none())
                    .build()
            })
            .map_err(|_| TransportError::Unreachable("http client init failed".to_string()))?
            .join()
            .map_err(|_| TransportError::Unreachable("http client init failed".to_string()))?
            .map_err(|_| TransportError::Unreachable("http client build failed".to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Builds the generateContent JSON body for one request.
    fn request_body(&self, request: &ReasoningRequest) -> Value {
        json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": request.document.media_type,
                            "data": BASE64.encode(&request.document.bytes)
                        }
                    },
                    {"text": request.prompt}
                ]
            }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }
}

impl ReasoningClient for GenerativeLanguageClient {
    fn invoke(&self, request: &ReasoningRequest) -> Result<String, TransportError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&self.request_body(request))
            .send()
            .map_err(|err| TransportError::Unreachable(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        let body = read_limited(response, self.config.max_response_bytes)?;
        extract_candidate_text(&body)
    }
}

// ============================================================================
// SECTION: Envelope Handling
// ============================================================================

/// Reads the response body with a hard size bound.
fn read_limited(
    response: reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, TransportError> {
    let limit = u64::try_from(max_bytes)
        .map_err(|_| TransportError::MalformedEnvelope("size limit exceeds u64".to_string()))?
        .saturating_add(1);
    let mut buf = Vec::new();
    response
        .take(limit)
        .read_to_end(&mut buf)
        .map_err(|err| TransportError::Unreachable(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(TransportError::ResponseTooLarge {
            limit: max_bytes,
        });
    }
    Ok(buf)
}

/// Concatenates candidate part text out of the response envelope.
fn extract_candidate_text(body: &[u8]) -> Result<String, TransportError> {
    let envelope: Value = serde_json::from_slice(body)
        .map_err(|err| TransportError::MalformedEnvelope(err.to_string()))?;
    let parts = envelope
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| TransportError::MalformedEnvelope("no candidate parts".to_string()))?;
    let text: String =
        parts.iter().filter_map(|part| part.get("text").and_then(Value::as_str)).collect();
    if text.is_empty() {
        return Err(TransportError::MalformedEnvelope("candidate text is empty".to_string()));
    }
    Ok(text)
}
