// crates/veridoc-core/src/core/verdict.rs
// ============================================================================
// Module: Veridoc Verdict Model
// Description: Typed verdict, evidence, and assessment records.
// Purpose: Provide a bounded-vocabulary result model with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the typed verdict returned to callers. Classification
//! is a closed vocabulary, confidence is clamped to `[0, 100]` at every
//! construction boundary, and evidence lists preserve discovery order
//! without deduplication. Sub-assessments are optional; a missing
//! assessment reads as "no evidence" throughout the rule engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Final document classification vocabulary.
///
/// # Invariants
/// - Wire form is UPPERCASE and stable.
/// - `Error` is constructed only by the decode/validate fallback path,
///   never by reconciliation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    /// No evidence of tampering.
    Original,
    /// Evidence is present but below the forgery bar.
    Suspicious,
    /// Confirmed tampering or a deterministic override.
    Forged,
    /// Decode or validation failure fallback.
    Error,
}

impl Classification {
    /// Returns the stable wire label for the classification.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Original => "ORIGINAL",
            Self::Suspicious => "SUSPICIOUS",
            Self::Forged => "FORGED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Confidence
// ============================================================================

/// Confidence score bounded to `[0, 100]`.
///
/// # Invariants
/// - Every constructor clamps; a `Confidence` value is always in range.
/// - Deserialization clamps out-of-range wire values instead of rejecting
///   them (graceful degradation for an advisory system).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    /// Maximum confidence value.
    pub const MAX: Self = Self(100);
    /// Minimum confidence value.
    pub const MIN: Self = Self(0);

    /// Creates a confidence score, clamping values above 100.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Creates a confidence score from a raw wire integer, clamping both ends.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Value is bounds-checked to [0, 100] before the cast."
    )]
    pub const fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            Self(0)
        } else if raw > 100 {
            Self(100)
        } else {
            Self(raw as u8)
        }
    }

    /// Returns the score as an integer in `[0, 100]`.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the smaller of this score and `cap`.
    #[must_use]
    pub fn capped_at(self, cap: Self) -> Self {
        self.min(cap)
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Evidence
// ============================================================================

/// Severity attached to a single evidence item.
///
/// # Invariants
/// - Wire form is lowercase and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Strong indication on its own.
    High,
    /// Meaningful but not conclusive.
    #[default]
    Medium,
    /// Contextual observation.
    Low,
}

/// Escalation tier assigned to an evidence item.
///
/// # Invariants
/// - Wire form is `TIER1`..`TIER3` and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceTier {
    /// Conclusive on its own.
    #[serde(rename = "TIER1")]
    Tier1,
    /// Requires corroboration.
    #[serde(rename = "TIER2")]
    Tier2,
    /// Background signal only.
    #[serde(rename = "TIER3")]
    Tier3,
}

/// A single named, severity-tagged observation supporting a classification.
///
/// # Invariants
/// - `kind` and `description` are opaque strings; no normalization applies.
/// - Items are kept in discovery order and never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Evidence category label.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description of the observation.
    pub description: String,
    /// Severity of the observation; defaults to `medium` when absent.
    #[serde(default)]
    pub severity: Severity,
    /// Optional escalation tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<EvidenceTier>,
}

impl EvidenceItem {
    /// Creates an evidence item with the given category and description.
    #[must_use]
    pub fn new(kind: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            severity,
            tier: None,
        }
    }
}

// ============================================================================
// SECTION: Assessments
// ============================================================================

/// Visual inspection assessment from the reasoning service.
///
/// # Invariants
/// - `confidence_score` is clamped to `[0, 100]`.
/// - `artifacts` preserves discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualAssessment {
    /// Whether digital tampering was observed.
    pub is_tampered: bool,
    /// Confidence in the tampering judgment.
    pub confidence_score: Confidence,
    /// Specific visual artifacts observed, in discovery order.
    #[serde(default, alias = "specific_artifacts")]
    pub artifacts: Vec<String>,
    /// Free-form note on capture quality.
    #[serde(default, alias = "quality_check")]
    pub quality_note: String,
}

/// Logical consistency assessment from the reasoning service.
///
/// # Invariants
/// - `confidence_score` is clamped to `[0, 100]`.
/// - Issue lists preserve discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalAssessment {
    /// Whether internal contradictions were found.
    pub has_contradictions: bool,
    /// Confidence in the contradiction judgment.
    pub confidence_score: Confidence,
    /// Arithmetic inconsistencies, in discovery order.
    #[serde(default)]
    pub math_errors: Vec<String>,
    /// Date inconsistencies, in discovery order.
    #[serde(default)]
    pub date_issues: Vec<String>,
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// The final structured classification result returned to a caller.
///
/// # Invariants
/// - `confidence` is always in `[0, 100]`.
/// - `classification == Forged` only with at least one supporting evidence
///   item or a recorded override reason in the summary.
/// - Evidence lists preserve discovery order; no deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Authoritative classification.
    pub classification: Classification,
    /// Authoritative confidence score.
    pub confidence: Confidence,
    /// Visual inspection assessment, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualAssessment>,
    /// Logical consistency assessment, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical: Option<LogicalAssessment>,
    /// Visual evidence items, in discovery order.
    #[serde(default)]
    pub visual_evidence: Vec<EvidenceItem>,
    /// Logical evidence items, in discovery order.
    #[serde(default)]
    pub logical_evidence: Vec<EvidenceItem>,
    /// Metadata evidence items, in discovery order.
    #[serde(default)]
    pub metadata_evidence: Vec<EvidenceItem>,
    /// Detected document type, when identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    /// Short explanation of the verdict; records which rules fired.
    pub summary: String,
    /// Extended model reasoning, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Verdict {
    /// Returns true when the visual assessment confirms tampering at or
    /// above `floor`.
    #[must_use]
    pub fn has_confirmed_tampering(&self, floor: Confidence) -> bool {
        self.visual
            .as_ref()
            .is_some_and(|visual| visual.is_tampered && visual.confidence_score >= floor)
    }

    /// Returns true when the logical assessment flags contradictions.
    #[must_use]
    pub fn has_contradictions(&self) -> bool {
        self.logical.as_ref().is_some_and(|logical| logical.has_contradictions)
    }
}
