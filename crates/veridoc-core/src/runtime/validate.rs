// crates/veridoc-core/src/runtime/validate.rs
// ============================================================================
// Module: Veridoc Schema Validator
// Description: Coerce decoded payloads into typed verdicts.
// Purpose: Resolve field aliases, clamp scores, and fail closed into ERROR.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The validator coerces a decoded payload span into a [`Verdict`]. Field
//! aliases are resolved through an explicit resolution table (canonical
//! name first, then aliases in declared order; first present value wins).
//! Missing evidence lists default to empty and out-of-range confidence
//! values clamp instead of rejecting: this is an advisory system and
//! graceful degradation is preferred over hard failure. A payload nested
//! one level under a generic envelope key is unwrapped exactly once;
//! deeper nesting is a failure, not a recursive search.
//!
//! Callers convert a [`SchemaError`] into the terminal fallback verdict via
//! [`fallback_verdict`]; that verdict never passes through reconciliation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::Classification;
use crate::core::Confidence;
use crate::core::EvidenceItem;
use crate::core::LogicalAssessment;
use crate::core::Severity;
use crate::core::Verdict;
use crate::core::VisualAssessment;

// ============================================================================
// SECTION: Field Resolution Table
// ============================================================================

/// Canonical field name plus legacy aliases, tried in declared order.
struct FieldSpec {
    /// Canonical field name, tried first.
    canonical: &'static str,
    /// Legacy aliases, tried in order after the canonical name.
    aliases: &'static [&'static str],
}

/// Classification field resolution.
const FIELD_CLASSIFICATION: FieldSpec = FieldSpec {
    canonical: "classification",
    aliases: &["final_classification"],
};

/// Confidence field resolution.
const FIELD_CONFIDENCE: FieldSpec = FieldSpec {
    canonical: "confidence",
    aliases: &["final_confidence"],
};

/// Summary field resolution.
const FIELD_SUMMARY: FieldSpec = FieldSpec {
    canonical: "summary",
    aliases: &[],
};

/// Visual assessment field resolution.
const FIELD_VISUAL: FieldSpec = FieldSpec {
    canonical: "visual_assessment",
    aliases: &["visual_analysis"],
};

/// Logical assessment field resolution.
const FIELD_LOGICAL: FieldSpec = FieldSpec {
    canonical: "logical_assessment",
    aliases: &["logical_analysis"],
};

/// Envelope keys eligible for the single-level unwrap.
const ENVELOPE_KEYS: &[&str] = &["analysis", "result", "response", "verdict", "data", "output"];

impl FieldSpec {
    /// Resolves the first present value for this field.
    fn resolve<'a>(&self, map: &'a Map<String, Value>) -> Option<&'a Value> {
        if let Some(value) = map.get(self.canonical) {
            return Some(value);
        }
        self.aliases.iter().find_map(|alias| map.get(*alias))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages are human-readable; they feed the fallback verdict cause.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The located span is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
    /// The payload is not a JSON object.
    #[error("payload is not a JSON object")]
    NotAnObject,
    /// A required field is absent after alias resolution and unwrapping.
    #[error("missing required field: {field}")]
    MissingField {
        /// Canonical name of the missing field.
        field: &'static str,
    },
    /// A field value could not be coerced to its expected type.
    #[error("field {field} has an invalid type or value")]
    InvalidField {
        /// Canonical name of the offending field.
        field: &'static str,
    },
    /// The classification string is outside the bounded vocabulary.
    #[error("unknown classification: {label}")]
    UnknownClassification {
        /// The rejected classification label.
        label: String,
    },
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Coerces a decoded payload span into a typed [`Verdict`].
///
/// # Errors
///
/// Returns [`SchemaError`] when the span is not valid JSON, when a required
/// field remains missing after alias resolution and the single envelope
/// unwrap, or when a value cannot be coerced.
pub fn validate_payload(span: &str) -> Result<Verdict, SchemaError> {
    let value: Value =
        serde_json::from_str(span).map_err(|err| SchemaError::InvalidJson(err.to_string()))?;
    let Value::Object(map) = value else {
        return Err(SchemaError::NotAnObject);
    };
    let map = unwrap_envelope(map);
    build_verdict(&map)
}

/// Unwraps the verdict one level when nested under a known envelope key.
///
/// The unwrap happens exactly once, and only when exactly one known
/// envelope key holds an object; an ambiguous payload with several
/// candidate envelopes stays as-is and surfaces as a missing-field
/// failure. Deeper nesting likewise fails rather than triggering a
/// recursive search.
fn unwrap_envelope(map: Map<String, Value>) -> Map<String, Value> {
    if FIELD_CLASSIFICATION.resolve(&map).is_some() {
        return map;
    }
    let unwrapped = {
        let mut candidates = ENVELOPE_KEYS.iter().filter_map(|key| match map.get(*key) {
            Some(Value::Object(inner)) => Some(inner),
            _ => None,
        });
        match (candidates.next(), candidates.next()) {
            (Some(inner), None) => Some(inner.clone()),
            _ => None,
        }
    };
    unwrapped.unwrap_or(map)
}

/// Builds the verdict from a resolved top-level object.
fn build_verdict(map: &Map<String, Value>) -> Result<Verdict, SchemaError> {
    let classification = parse_classification(
        FIELD_CLASSIFICATION.resolve(map).ok_or(SchemaError::MissingField {
            field: FIELD_CLASSIFICATION.canonical,
        })?,
    )?;
    let confidence =
        parse_confidence(FIELD_CONFIDENCE.resolve(map).ok_or(SchemaError::MissingField {
            field: FIELD_CONFIDENCE.canonical,
        })?)?;
    let summary = FIELD_SUMMARY
        .resolve(map)
        .ok_or(SchemaError::MissingField {
            field: FIELD_SUMMARY.canonical,
        })?
        .as_str()
        .ok_or(SchemaError::InvalidField {
            field: FIELD_SUMMARY.canonical,
        })?
        .to_string();

    let visual = parse_optional::<VisualAssessment>(FIELD_VISUAL.resolve(map), "visual_assessment")?;
    let logical =
        parse_optional::<LogicalAssessment>(FIELD_LOGICAL.resolve(map), "logical_assessment")?;
    let visual_evidence = parse_evidence(map.get("visual_evidence"), "visual_evidence")?;
    let logical_evidence = parse_evidence(map.get("logical_evidence"), "logical_evidence")?;
    let metadata_evidence = parse_evidence(map.get("metadata_evidence"), "metadata_evidence")?;
    let document_type =
        map.get("document_type").and_then(Value::as_str).map(ToString::to_string);
    let reasoning = map.get("reasoning").and_then(Value::as_str).map(ToString::to_string);

    Ok(Verdict {
        classification,
        confidence,
        visual,
        logical,
        visual_evidence,
        logical_evidence,
        metadata_evidence,
        document_type,
        summary,
        reasoning,
    })
}

/// Parses the classification label against the bounded vocabulary.
///
/// A model-supplied `ERROR` is rejected: only the fallback path may
/// construct [`Classification::Error`].
fn parse_classification(value: &Value) -> Result<Classification, SchemaError> {
    let label = value.as_str().ok_or(SchemaError::InvalidField {
        field: FIELD_CLASSIFICATION.canonical,
    })?;
    match label.trim().to_ascii_uppercase().as_str() {
        "ORIGINAL" => Ok(Classification::Original),
        "SUSPICIOUS" => Ok(Classification::Suspicious),
        "FORGED" => Ok(Classification::Forged),
        other => Err(SchemaError::UnknownClassification {
            label: other.to_string(),
        }),
    }
}

/// Parses and clamps the confidence value.
fn parse_confidence(value: &Value) -> Result<Confidence, SchemaError> {
    if let Some(raw) = value.as_i64() {
        return Ok(Confidence::from_raw(raw));
    }
    if let Some(raw) = value.as_f64() {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Clamped to [0, 100] by Confidence::from_raw."
        )]
        return Ok(Confidence::from_raw(raw.round() as i64));
    }
    Err(SchemaError::InvalidField {
        field: FIELD_CONFIDENCE.canonical,
    })
}

/// Deserializes an optional sub-object; absence is never a failure.
fn parse_optional<T: serde::de::DeserializeOwned>(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<T>, SchemaError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|_| {
            SchemaError::InvalidField {
                field,
            }
        }),
    }
}

/// Parses an evidence list; absence defaults to empty.
fn parse_evidence(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Vec<EvidenceItem>, SchemaError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|_| {
            SchemaError::InvalidField {
                field,
            }
        }),
    }
}

// ============================================================================
// SECTION: Fallback Verdict
// ============================================================================

/// Builds the terminal fallback verdict for decode or schema failures.
///
/// The fallback carries a single synthetic evidence item with the
/// human-readable cause and is returned to the caller without passing
/// through reconciliation.
#[must_use]
pub fn fallback_verdict(cause: &str) -> Verdict {
    Verdict {
        classification: Classification::Error,
        confidence: Confidence::MIN,
        visual: None,
        logical: None,
        visual_evidence: Vec::new(),
        logical_evidence: Vec::new(),
        metadata_evidence: vec![EvidenceItem::new(
            "parse_failure",
            cause.to_string(),
            Severity::High,
        )],
        document_type: None,
        summary: format!("Analysis response could not be parsed: {cause}"),
        reasoning: None,
    }
}
