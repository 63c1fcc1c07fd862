// crates/veridoc-server/src/server.rs
// ============================================================================
// Module: Analysis HTTP Server
// Description: HTTP surface for document forgery analysis requests.
// Purpose: Expose the analysis pipeline over a small axum application.
// Dependencies: veridoc-core, veridoc-config, veridoc-providers, axum, tokio
// ============================================================================

//! ## Overview
//! The server exposes two routes: a health probe at `/` and the analysis
//! endpoint at `/api/analyze-document`. Uploads arrive as a raw body with
//! their declared media type in `Content-Type` and an optional display
//! name in `x-veridoc-filename`. Each request runs the full pipeline on a
//! blocking worker and returns either the verdict envelope or a
//! machine-readable error with a `detail` field. Security posture: bodies
//! are untrusted and size-capped before any processing; document bytes
//! never appear in logs or error payloads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use veridoc_config::VeridocConfig;
use veridoc_core::AnalysisPipeline;
use veridoc_core::InputError;
use veridoc_core::PipelineError;
use veridoc_providers::ForensicsPromptBuilder;
use veridoc_providers::GenerativeLanguageClient;
use veridoc_providers::MetadataExtractor;
use veridoc_providers::ReasoningClientConfig;

use crate::audit::AnalyzeAuditEvent;
use crate::audit::AuditSink;
use crate::audit::StderrAuditSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Service identifier reported by the health probe.
const SERVICE_NAME: &str = "veridoc-analysis";

/// Header carrying the client-supplied display name for the upload.
const FILENAME_HEADER: &str = "x-veridoc-filename";

/// Display name used when the client supplies none.
const DEFAULT_FILENAME: &str = "upload";

/// Headroom added to the framework body limit above the configured cap.
///
/// The framework limit sits above the configured cap so the handler check
/// stays the authoritative 413 and produces the `detail` envelope and the
/// audit record.
const BODY_LIMIT_HEADROOM: usize = 1024;

// ============================================================================
// SECTION: Analysis Server
// ============================================================================

/// Concrete pipeline wired to the production collaborators.
type ForensicsPipeline =
    AnalysisPipeline<MetadataExtractor, ForensicsPromptBuilder, GenerativeLanguageClient>;

/// Analysis server instance.
pub struct AnalyzeServer {
    /// Bind address for the HTTP listener.
    bind: String,
    /// Shared per-request state.
    state: Arc<ServerState>,
}

impl AnalyzeServer {
    /// Builds a server from validated configuration.
    ///
    /// The reasoning-service API key is read once at startup from the
    /// environment variable named in the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the configuration is invalid, the API
    /// key is absent, or the reasoning client cannot be constructed.
    pub fn from_config(config: &VeridocConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let api_key = std::env::var(&config.reasoning.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ServerError::Config(format!(
                    "api key environment variable {} is unset",
                    config.reasoning.api_key_env
                ))
            })?;
        let client = GenerativeLanguageClient::new(ReasoningClientConfig {
            base_url: config.reasoning.base_url.clone(),
            model: config.reasoning.model.clone(),
            api_key,
            timeout_ms: config.reasoning.timeout_ms,
            max_response_bytes: config.reasoning.max_response_bytes,
            temperature: config.reasoning.temperature,
            ..ReasoningClientConfig::default()
        })
        .map_err(|err| ServerError::Init(err.to_string()))?;
        let pipeline = AnalysisPipeline::new(
            MetadataExtractor,
            ForensicsPromptBuilder::from_override(config.reasoning.prompt.as_deref()),
            client,
            config.reconcile_policy(),
            config.side_channel_checks(),
        );
        let state = Arc::new(ServerState {
            pipeline,
            max_body_bytes: config.server.max_body_bytes,
            audit: Arc::new(StderrAuditSink),
        });
        Ok(Self {
            bind: config.server.bind.clone(),
            state,
        })
    }

    /// Serves analysis requests until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the bind address is invalid or the
    /// listener cannot be established.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .bind
            .parse()
            .map_err(|_| ServerError::Config("invalid bind address".to_string()))?;
        let app = router(self.state);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| ServerError::Transport("http bind failed".to_string()))?;
        axum::serve(listener, app)
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

/// Builds the application router over shared state.
///
/// The framework body limit is raised above the configured cap so bodies
/// up to that cap always reach [`handle_analyze`].
fn router(state: Arc<ServerState>) -> Router {
    let body_limit = state.max_body_bytes.saturating_add(BODY_LIMIT_HEADROOM);
    Router::new()
        .route("/", get(handle_health))
        .route("/api/analyze-document", post(handle_analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Shared server state for request handlers.
struct ServerState {
    /// Analysis pipeline shared across requests.
    pipeline: ForensicsPipeline,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
    /// Audit sink for per-request events.
    audit: Arc<dyn AuditSink>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Health probe body.
#[derive(Debug, Serialize)]
struct HealthBody {
    /// Liveness indicator.
    status: &'static str,
    /// Service identifier.
    service: &'static str,
}

/// Handles the health probe.
async fn handle_health() -> impl IntoResponse {
    axum::Json(HealthBody {
        status: "ok",
        service: SERVICE_NAME,
    })
}

/// Handles one analysis upload.
async fn handle_analyze(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> impl IntoResponse {
    let started = Instant::now();
    let filename = header_value(&headers, FILENAME_HEADER)
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    let media_type = declared_media_type(&headers);

    let task_state = Arc::clone(&state);
    let task_filename = filename.clone();
    let task_media = media_type.clone();
    let joined = tokio::task::spawn_blocking(move || {
        process_upload(&task_state, &task_filename, task_media.as_deref(), &bytes[..])
    })
    .await;
    let processed = match joined {
        Ok(processed) => processed,
        Err(_) => {
            ProcessedRequest::failure(StatusCode::INTERNAL_SERVER_ERROR, "analysis task failed")
        }
    };

    state.audit.record(&AnalyzeAuditEvent {
        event: "analyze_document",
        timestamp_ms: AnalyzeAuditEvent::now_ms(),
        filename,
        media_type,
        request_bytes: processed.request_bytes,
        status: processed.status.as_u16(),
        classification: processed.classification,
        latency_ms: started.elapsed().as_millis(),
        redaction: "document content withheld",
    });
    (processed.status, axum::Json(processed.body))
}

/// Outcome of one processed upload.
struct ProcessedRequest {
    /// HTTP status for the response.
    status: StatusCode,
    /// Final classification label when a verdict was produced.
    classification: Option<&'static str>,
    /// JSON response body.
    body: Value,
    /// Observed request body size.
    request_bytes: usize,
}

impl ProcessedRequest {
    /// Builds an error outcome with a `detail` body.
    fn failure(status: StatusCode, detail: &str) -> Self {
        Self {
            status,
            classification: None,
            body: error_body(detail),
            request_bytes: 0,
        }
    }
}

/// Runs the pipeline for one upload and maps the result onto HTTP.
fn process_upload(
    state: &ServerState,
    filename: &str,
    media_type: Option<&str>,
    bytes: &[u8],
) -> ProcessedRequest {
    if bytes.len() > state.max_body_bytes {
        return ProcessedRequest {
            request_bytes: bytes.len(),
            ..ProcessedRequest::failure(
                StatusCode::PAYLOAD_TOO_LARGE,
                "request body exceeds the configured limit",
            )
        };
    }
    let Some(media_type) = media_type else {
        return ProcessedRequest {
            request_bytes: bytes.len(),
            ..ProcessedRequest::failure(StatusCode::BAD_REQUEST, "missing content-type header")
        };
    };

    let outcome = state.pipeline.analyze(bytes, media_type);
    let (status, classification, body) = match outcome {
        Ok(verdict) => {
            let classification = verdict.classification.as_str();
            match serde_json::to_value(&verdict) {
                Ok(analysis) => (
                    StatusCode::OK,
                    Some(classification),
                    json!({ "filename": filename, "analysis": analysis }),
                ),
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    error_body("verdict serialization failed"),
                ),
            }
        }
        Err(err) => {
            let (status, detail) = map_pipeline_error(&err);
            (status, None, error_body(&detail))
        }
    };
    ProcessedRequest {
        status,
        classification,
        body,
        request_bytes: bytes.len(),
    }
}

/// Maps fatal pipeline errors onto HTTP statuses and client-safe details.
fn map_pipeline_error(err: &PipelineError) -> (StatusCode, String) {
    match err {
        PipelineError::Input(InputError::EmptyContent) => {
            (StatusCode::BAD_REQUEST, "uploaded document is empty".to_string())
        }
        PipelineError::Input(InputError::UnsupportedMedia {
            media_type,
        }) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("unsupported media type: {media_type}"),
        ),
        PipelineError::Extract(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "content extraction failed".to_string())
        }
        PipelineError::Transport(inner) => {
            (StatusCode::BAD_GATEWAY, format!("analysis service unavailable: {inner}"))
        }
    }
}

/// Builds the error envelope with a `detail` field.
fn error_body(detail: &str) -> Value {
    json!({ "detail": detail })
}

/// Reads a header value as an owned string when present and valid UTF-8.
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
}

/// Extracts the declared media type, dropping any parameters.
fn declared_media_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Analysis server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only request assertions."
    )]
    #![allow(unsafe_code, reason = "Tests mutate process env for configuration.")]

    use std::sync::Arc;
    use std::thread;

    use axum::http::HeaderMap;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;
    use veridoc_config::VeridocConfig;
    use veridoc_core::AnalysisPipeline;
    use veridoc_core::ReconcilePolicy;
    use veridoc_core::default_side_channel_checks;
    use veridoc_providers::ForensicsPromptBuilder;
    use veridoc_providers::GenerativeLanguageClient;
    use veridoc_providers::MetadataExtractor;
    use veridoc_providers::ReasoningClientConfig;

    use super::AnalyzeServer;
    use super::ServerState;
    use super::declared_media_type;
    use super::process_upload;
    use super::router;
    use crate::audit::NoopAuditSink;

    /// Sets an environment variable for the current process.
    fn set_env_var(key: &str, value: &str) {
        // SAFETY: Tests set process env before server construction; no
        // other thread in this binary reads the variable concurrently.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    /// Builds server state whose reasoning client targets `base_url`.
    fn state_for(base_url: String) -> ServerState {
        state_with_limit(base_url, 1024)
    }

    /// Builds server state with an explicit body cap.
    fn state_with_limit(base_url: String, max_body_bytes: usize) -> ServerState {
        let client = GenerativeLanguageClient::new(ReasoningClientConfig {
            base_url,
            api_key: "test-key".to_string(),
            timeout_ms: 5_000,
            ..ReasoningClientConfig::default()
        })
        .unwrap();
        let pipeline = AnalysisPipeline::new(
            MetadataExtractor,
            ForensicsPromptBuilder::default(),
            client,
            ReconcilePolicy::default(),
            default_side_channel_checks(),
        );
        ServerState {
            pipeline,
            max_body_bytes,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Serves exactly one canned response and returns the base URL.
    fn one_shot_server(status: u16, body: String) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(tiny_http::StatusCode(status));
                let _ = request.respond(response);
            }
        });
        format!("http://{addr}")
    }

    /// Gemini-style envelope wrapping one model text part.
    fn envelope(text: &str) -> String {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": text } ] } }
            ]
        })
        .to_string()
    }

    #[test]
    fn oversized_body_is_rejected_before_processing() {
        let state = state_for("http://127.0.0.1:9".to_string());
        let body = vec![0_u8; 2048];
        let processed = process_upload(&state, "big.pdf", Some("application/pdf"), &body);
        assert_eq!(processed.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(processed.request_bytes, 2048);
    }

    #[test]
    fn missing_media_type_is_a_client_error() {
        let state = state_for("http://127.0.0.1:9".to_string());
        let processed = process_upload(&state, "doc.pdf", None, b"%PDF-1.4");
        assert_eq!(processed.status, StatusCode::BAD_REQUEST);
        assert_eq!(processed.body["detail"], "missing content-type header");
    }

    #[test]
    fn empty_body_is_a_client_error() {
        let state = state_for("http://127.0.0.1:9".to_string());
        let processed = process_upload(&state, "doc.pdf", Some("application/pdf"), b"");
        assert_eq!(processed.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unsupported_media_type_is_rejected() {
        let state = state_for("http://127.0.0.1:9".to_string());
        let processed = process_upload(&state, "doc.txt", Some("text/plain"), b"hello");
        assert_eq!(processed.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(processed.classification, None);
    }

    #[test]
    fn unreachable_reasoning_service_maps_to_bad_gateway() {
        let state = state_for("http://127.0.0.1:9".to_string());
        let processed = process_upload(&state, "doc.pdf", Some("application/pdf"), b"%PDF-1.4");
        assert_eq!(processed.status, StatusCode::BAD_GATEWAY);
        assert!(
            processed.body["detail"]
                .as_str()
                .unwrap()
                .starts_with("analysis service unavailable")
        );
    }

    #[test]
    fn successful_analysis_returns_the_verdict_envelope() {
        let verdict = r#"{"classification":"ORIGINAL","confidence":95,"summary":"Clean document."}"#;
        let base_url = one_shot_server(200, envelope(verdict));
        let state = state_for(base_url);
        let processed = process_upload(&state, "doc.pdf", Some("application/pdf"), b"%PDF-1.4");
        assert_eq!(processed.status, StatusCode::OK);
        assert_eq!(processed.classification, Some("ORIGINAL"));
        assert_eq!(processed.body["filename"], "doc.pdf");
        assert_eq!(processed.body["analysis"]["classification"], "ORIGINAL");
        assert_eq!(processed.body["analysis"]["confidence"], 95);
    }

    #[test]
    fn malformed_model_output_still_yields_an_error_verdict() {
        let base_url = one_shot_server(200, envelope("not json at all"));
        let state = state_for(base_url);
        let processed = process_upload(&state, "doc.pdf", Some("application/pdf"), b"%PDF-1.4");
        assert_eq!(processed.status, StatusCode::OK);
        assert_eq!(processed.classification, Some("ERROR"));
        assert_eq!(processed.body["analysis"]["confidence"], 0);
    }

    #[test]
    fn declared_media_type_drops_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "Application/PDF; charset=binary".parse().unwrap());
        assert_eq!(declared_media_type(&headers), Some("application/pdf".to_string()));
    }

    #[tokio::test]
    async fn health_probe_reports_ok() {
        let response = super::handle_health().await.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "veridoc-analysis");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn from_config_initializes_inside_an_async_runtime() {
        set_env_var("VERIDOC_API_KEY", "test-key");
        let server = AnalyzeServer::from_config(&VeridocConfig::default()).unwrap();
        // The blocking reasoning client shuts down off the async workers.
        tokio::task::spawn_blocking(move || drop(server)).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn configured_body_limit_reaches_the_handler() {
        // A body between the 2 MiB framework default and the configured cap
        // must reach the handler instead of being rejected upstream.
        let state = Arc::new(state_with_limit("http://127.0.0.1:9".to_string(), 4 * 1024 * 1024));
        let app = router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let body = vec![b'a'; 3 * 1024 * 1024];
        let head = format!(
            "POST /api/analyze-document HTTP/1.1\r\nHost: {addr}\r\n\
             Content-Type: application/pdf\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n",
            body.len()
        );
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(&body).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        let text = String::from_utf8_lossy(&response);
        assert!(text.starts_with("HTTP/1.1 502"), "unexpected response: {text}");
        assert!(text.contains("analysis service unavailable"));
    }
}
