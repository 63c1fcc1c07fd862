// crates/veridoc-core/tests/schema_validation.rs
// ============================================================================
// Module: Schema Validation Tests
// Description: Validate payload coercion into typed verdicts.
// Purpose: Ensure alias resolution, clamping, unwrap, and fallback behavior.
// Dependencies: veridoc-core, serde_json
// ============================================================================

//! Validator behavior tests for alias resolution, clamping, and the
//! fallback ERROR verdict.

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

use veridoc_core::Classification;
use veridoc_core::Confidence;
use veridoc_core::SchemaError;
use veridoc_core::Severity;
use veridoc_core::fallback_verdict;
use veridoc_core::validate_payload;

#[test]
fn canonical_fields_validate() -> Result<(), Box<dyn std::error::Error>> {
    let verdict = validate_payload(
        r#"{"classification":"SUSPICIOUS","confidence":60,"summary":"odd spacing"}"#,
    )?;
    assert_eq!(verdict.classification, Classification::Suspicious);
    assert_eq!(verdict.confidence.get(), 60);
    assert_eq!(verdict.summary, "odd spacing");
    assert!(verdict.visual_evidence.is_empty());
    assert!(verdict.logical_evidence.is_empty());
    assert!(verdict.metadata_evidence.is_empty());
    Ok(())
}

#[test]
fn legacy_aliases_resolve_when_canonical_names_absent()
-> Result<(), Box<dyn std::error::Error>> {
    let verdict = validate_payload(
        r#"{"final_classification":"FORGED","final_confidence":88,"summary":"s"}"#,
    )?;
    assert_eq!(verdict.classification, Classification::Forged);
    assert_eq!(verdict.confidence.get(), 88);
    Ok(())
}

#[test]
fn canonical_name_wins_over_alias() -> Result<(), Box<dyn std::error::Error>> {
    let verdict = validate_payload(
        r#"{"classification":"ORIGINAL","final_classification":"FORGED",
            "confidence":10,"final_confidence":90,"summary":"s"}"#,
    )?;
    assert_eq!(verdict.classification, Classification::Original);
    assert_eq!(verdict.confidence.get(), 10);
    Ok(())
}

#[test]
fn out_of_range_confidence_clamps_instead_of_rejecting()
-> Result<(), Box<dyn std::error::Error>> {
    let high =
        validate_payload(r#"{"classification":"ORIGINAL","confidence":150,"summary":"s"}"#)?;
    assert_eq!(high.confidence, Confidence::MAX);
    let low = validate_payload(r#"{"classification":"ORIGINAL","confidence":-5,"summary":"s"}"#)?;
    assert_eq!(low.confidence, Confidence::MIN);
    Ok(())
}

#[test]
fn missing_summary_is_a_schema_error() {
    let result = validate_payload(r#"{"classification":"ORIGINAL","confidence":50}"#);
    assert!(matches!(
        result,
        Err(SchemaError::MissingField {
            field: "summary"
        })
    ));
}

#[test]
fn single_level_envelope_unwraps_once() -> Result<(), Box<dyn std::error::Error>> {
    let verdict = validate_payload(
        r#"{"analysis":{"classification":"SUSPICIOUS","confidence":40,"summary":"s"}}"#,
    )?;
    assert_eq!(verdict.classification, Classification::Suspicious);
    Ok(())
}

#[test]
fn ambiguous_envelope_with_two_candidate_keys_is_not_unwrapped() {
    // Two known envelope keys holding objects leave the payload as-is.
    let result = validate_payload(
        r#"{"analysis":{"classification":"ORIGINAL","confidence":1,"summary":"s"},"result":{"classification":"FORGED","confidence":1,"summary":"s"}}"#,
    );
    assert!(matches!(
        result,
        Err(SchemaError::MissingField {
            field: "classification"
        })
    ));
}

#[test]
fn doubly_nested_envelope_fails_rather_than_recursing() {
    let result = validate_payload(
        r#"{"analysis":{"result":{"classification":"ORIGINAL","confidence":1,"summary":"s"}}}"#,
    );
    assert!(result.is_err());
}

#[test]
fn model_supplied_error_classification_is_rejected() {
    // Only the decode/validate fallback path may construct ERROR.
    let result = validate_payload(r#"{"classification":"ERROR","confidence":0,"summary":"s"}"#);
    assert!(matches!(result, Err(SchemaError::UnknownClassification { .. })));
}

#[test]
fn assessments_resolve_legacy_wire_names() -> Result<(), Box<dyn std::error::Error>> {
    let verdict = validate_payload(
        r#"{
            "classification":"FORGED","confidence":95,"summary":"s",
            "visual_analysis":{"is_tampered":true,"confidence_score":92,
                "specific_artifacts":["Mismatched fonts"],"quality_check":"sharp"},
            "logical_analysis":{"has_contradictions":false,"confidence_score":80,
                "math_errors":[],"date_issues":[]}
        }"#,
    )?;
    let visual = verdict.visual.ok_or("visual assessment missing")?;
    assert!(visual.is_tampered);
    assert_eq!(visual.confidence_score.get(), 92);
    assert_eq!(visual.artifacts, vec!["Mismatched fonts".to_string()]);
    assert_eq!(visual.quality_note, "sharp");
    let logical = verdict.logical.ok_or("logical assessment missing")?;
    assert!(!logical.has_contradictions);
    Ok(())
}

#[test]
fn evidence_items_preserve_order_and_duplicates() -> Result<(), Box<dyn std::error::Error>> {
    let verdict = validate_payload(
        r#"{
            "classification":"SUSPICIOUS","confidence":70,"summary":"s",
            "visual_evidence":[
                {"type":"smear","description":"digital smear","severity":"high"},
                {"type":"smear","description":"digital smear","severity":"high"},
                {"type":"font","description":"mixed fonts","severity":"low","tier":"TIER2"}
            ]
        }"#,
    )?;
    assert_eq!(verdict.visual_evidence.len(), 3);
    assert_eq!(verdict.visual_evidence[0], verdict.visual_evidence[1]);
    assert_eq!(verdict.visual_evidence[2].kind, "font");
    Ok(())
}

#[test]
fn evidence_severity_defaults_to_medium() -> Result<(), Box<dyn std::error::Error>> {
    let verdict = validate_payload(
        r#"{
            "classification":"SUSPICIOUS","confidence":70,"summary":"s",
            "logical_evidence":[{"type":"math","description":"totals differ"}]
        }"#,
    )?;
    assert_eq!(verdict.logical_evidence[0].severity, Severity::Medium);
    Ok(())
}

#[test]
fn invalid_json_span_is_a_schema_error() {
    let result = validate_payload("{not json}");
    assert!(matches!(result, Err(SchemaError::InvalidJson(_))));
}

#[test]
fn fallback_verdict_carries_cause_and_zero_confidence() {
    let verdict = fallback_verdict("missing required field: summary");
    assert_eq!(verdict.classification, Classification::Error);
    assert_eq!(verdict.confidence, Confidence::MIN);
    assert_eq!(verdict.metadata_evidence.len(), 1);
    assert_eq!(verdict.metadata_evidence[0].kind, "parse_failure");
    assert!(verdict.metadata_evidence[0].description.contains("summary"));
    assert!(verdict.summary.contains("could not be parsed"));
}
