// crates/veridoc-config/src/config.rs
// ============================================================================
// Module: Veridoc Configuration
// Description: Configuration loading and validation for Veridoc.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: veridoc-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits.
//! Missing files yield defaults; present-but-invalid files fail closed.
//! All thresholds map onto [`veridoc_core::ReconcilePolicy`] so the rule
//! engine never reads configuration directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use veridoc_core::Confidence;
use veridoc_core::ReconcilePolicy;
use veridoc_core::SideChannelCheck;
use veridoc_core::runtime::ConflictingPeriodCheck;
use veridoc_core::runtime::UnmarkedAmountCheck;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "veridoc.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "VERIDOC_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Default server bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum upload body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// Maximum allowed upload body size in bytes.
const MAX_MAX_BODY_BYTES: usize = 100 * 1024 * 1024;
/// Default reasoning endpoint base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default reasoning model identifier.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Default environment variable holding the API key.
const DEFAULT_API_KEY_ENV: &str = "VERIDOC_API_KEY";
/// Default reasoning request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
/// Minimum reasoning request timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 1_000;
/// Maximum reasoning request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 300_000;
/// Default maximum reasoning response size in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Maximum allowed reasoning response size in bytes.
const MAX_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;
/// Default sampling temperature for the reasoning service.
const DEFAULT_TEMPERATURE: f64 = 0.1;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {reason}")]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying error description.
        reason: String,
    },
    /// The configuration file exceeds the size limit.
    #[error("config file {path} exceeds {limit} bytes")]
    TooLarge {
        /// Path that failed to load.
        path: PathBuf,
        /// Maximum allowed file size in bytes.
        limit: u64,
    },
    /// The configuration file is not valid TOML for this model.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// A configuration value is outside its allowed bounds.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted field path of the offending value.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// Root configuration for Veridoc.
///
/// # Invariants
/// - `validate` must pass before the config is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct VeridocConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Reasoning service settings.
    pub reasoning: ReasoningConfig,
    /// Reconciliation thresholds and vocabularies.
    pub reconcile: ReconcileConfig,
    /// Side-channel check selection.
    pub sidechannel: SideChannelConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Bind address for the upload endpoint.
    pub bind: String,
    /// Maximum accepted upload body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Reasoning service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ReasoningConfig {
    /// Base URL of the generative-language endpoint.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Full request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size in bytes.
    pub max_response_bytes: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Optional instruction-prompt override (wording is configuration).
    pub prompt: Option<String>,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            temperature: DEFAULT_TEMPERATURE,
            prompt: None,
        }
    }
}

/// Reconciliation thresholds and vocabularies.
///
/// Defaults mirror [`ReconcilePolicy::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ReconcileConfig {
    /// Quality-note terms indicating degraded capture.
    pub low_quality_terms: Vec<String>,
    /// Visual tamper confidence above which the quality gate stands down.
    pub quality_gate_tamper_max: u8,
    /// Visual confidence floor for confirmed tampering.
    pub tamper_confirm_floor: u8,
    /// Confidence cap applied by the phase-discipline downgrade.
    pub phase_discipline_cap: u8,
    /// Confidence cap applied by logical-only containment.
    pub logical_containment_cap: u8,
    /// Confidence floor below which weak signals are suppressed.
    pub weak_signal_floor: u8,
    /// Editing-tool fingerprints that count as hard visual proof.
    pub tool_fingerprints: Vec<String>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        let policy = ReconcilePolicy::default();
        Self {
            low_quality_terms: policy.low_quality_terms,
            quality_gate_tamper_max: policy.quality_gate_tamper_max.get(),
            tamper_confirm_floor: policy.tamper_confirm_floor.get(),
            phase_discipline_cap: policy.phase_discipline_cap.get(),
            logical_containment_cap: policy.logical_containment_cap.get(),
            weak_signal_floor: policy.weak_signal_floor.get(),
            tool_fingerprints: policy.tool_fingerprints,
        }
    }
}

/// Side-channel check selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SideChannelConfig {
    /// Whether side-channel overrides run at all.
    pub enabled: bool,
    /// Ordered check identifiers to enable.
    pub checks: Vec<String>,
}

impl Default for SideChannelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            checks: vec!["conflicting-period".to_string(), "unmarked-amount".to_string()],
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl VeridocConfig {
    /// Loads configuration from the given path, the `VERIDOC_CONFIG`
    /// environment override, or `veridoc.toml` in the working directory.
    ///
    /// A missing file yields defaults; a present-but-invalid file fails
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on read failure, oversized files, parse
    /// failure, or out-of-bounds values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = path.map_or_else(
            || env::var(CONFIG_ENV_VAR).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from),
            Path::to_path_buf,
        );
        if !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let metadata = fs::metadata(&resolved).map_err(|err| ConfigError::Io {
            path: resolved.clone(),
            reason: err.to_string(),
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                path: resolved,
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }
        let raw = fs::read_to_string(&resolved).map_err(|err| ConfigError::Io {
            path: resolved.clone(),
            reason: err.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all bounds; fails closed on the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.bind.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            field: "server.bind",
            reason: format!("not a socket address: {}", self.server.bind),
        })?;
        if self.server.max_body_bytes == 0 || self.server.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid {
                field: "server.max_body_bytes",
                reason: format!("must be in 1..={MAX_MAX_BODY_BYTES}"),
            });
        }
        if self.reasoning.base_url.is_empty() || self.reasoning.model.is_empty() {
            return Err(ConfigError::Invalid {
                field: "reasoning.base_url",
                reason: "base_url and model must be non-empty".to_string(),
            });
        }
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.reasoning.timeout_ms) {
            return Err(ConfigError::Invalid {
                field: "reasoning.timeout_ms",
                reason: format!("must be in {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS}"),
            });
        }
        if self.reasoning.max_response_bytes == 0
            || self.reasoning.max_response_bytes > MAX_MAX_RESPONSE_BYTES
        {
            return Err(ConfigError::Invalid {
                field: "reasoning.max_response_bytes",
                reason: format!("must be in 1..={MAX_MAX_RESPONSE_BYTES}"),
            });
        }
        if !(0.0..=2.0).contains(&self.reasoning.temperature) {
            return Err(ConfigError::Invalid {
                field: "reasoning.temperature",
                reason: "must be in 0.0..=2.0".to_string(),
            });
        }
        for bound in [
            ("reconcile.quality_gate_tamper_max", self.reconcile.quality_gate_tamper_max),
            ("reconcile.tamper_confirm_floor", self.reconcile.tamper_confirm_floor),
            ("reconcile.phase_discipline_cap", self.reconcile.phase_discipline_cap),
            ("reconcile.logical_containment_cap", self.reconcile.logical_containment_cap),
            ("reconcile.weak_signal_floor", self.reconcile.weak_signal_floor),
        ] {
            if bound.1 > 100 {
                return Err(ConfigError::Invalid {
                    field: bound.0,
                    reason: "must be in 0..=100".to_string(),
                });
            }
        }
        for check in &self.sidechannel.checks {
            if !matches!(check.as_str(), "conflicting-period" | "unmarked-amount") {
                return Err(ConfigError::Invalid {
                    field: "sidechannel.checks",
                    reason: format!("unknown check id: {check}"),
                });
            }
        }
        Ok(())
    }

    /// Converts reconciliation settings into the core policy.
    #[must_use]
    pub fn reconcile_policy(&self) -> ReconcilePolicy {
        ReconcilePolicy {
            low_quality_terms: self.reconcile.low_quality_terms.clone(),
            quality_gate_tamper_max: Confidence::new(self.reconcile.quality_gate_tamper_max),
            tamper_confirm_floor: Confidence::new(self.reconcile.tamper_confirm_floor),
            phase_discipline_cap: Confidence::new(self.reconcile.phase_discipline_cap),
            logical_containment_cap: Confidence::new(self.reconcile.logical_containment_cap),
            weak_signal_floor: Confidence::new(self.reconcile.weak_signal_floor),
            tool_fingerprints: self.reconcile.tool_fingerprints.clone(),
        }
    }

    /// Builds the configured ordered side-channel check list.
    #[must_use]
    pub fn side_channel_checks(&self) -> Vec<Box<dyn SideChannelCheck>> {
        if !self.sidechannel.enabled {
            return Vec::new();
        }
        self.sidechannel
            .checks
            .iter()
            .filter_map(|id| -> Option<Box<dyn SideChannelCheck>> {
                match id.as_str() {
                    "conflicting-period" => Some(Box::new(ConflictingPeriodCheck)),
                    "unmarked-amount" => Some(Box::new(UnmarkedAmountCheck)),
                    _ => None,
                }
            })
            .collect()
    }
}
