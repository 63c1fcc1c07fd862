// crates/veridoc-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Veridoc configuration. Output is deterministic
//! and kept in sync with the config model defaults.

/// Returns a canonical example `veridoc.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8080"
max_body_bytes = 10485760

[reasoning]
base_url = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-2.5-flash"
api_key_env = "VERIDOC_API_KEY"
timeout_ms = 60000
max_response_bytes = 1048576
temperature = 0.1
# prompt = "custom forensic instructions"

[reconcile]
low_quality_terms = ["low", "blurry", "grainy", "out of focus", "poor scan"]
quality_gate_tamper_max = 90
tamper_confirm_floor = 85
phase_discipline_cap = 70
logical_containment_cap = 75
weak_signal_floor = 90
tool_fingerprints = [
    "photoshop",
    "gimp",
    "clone stamp",
    "content-aware",
    "healing brush",
    "affinity photo",
]

[sidechannel]
enabled = true
checks = ["conflicting-period", "unmarked-amount"]
"#,
    )
}
