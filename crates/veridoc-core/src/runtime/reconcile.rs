// crates/veridoc-core/src/runtime/reconcile.rs
// ============================================================================
// Module: Veridoc Evidence Reconciliation Engine
// Description: Ordered rule fold deriving the authoritative verdict.
// Purpose: Suppress weak-signal false positives and under-weighted misses.
// Dependencies: crate::core, crate::runtime::sidechannel
// ============================================================================

//! ## Overview
//! The reasoning service's own classification is advisory. This engine
//! re-derives the authoritative classification and confidence from the
//! structured evidence through a fixed, auditable rule order. Each rule
//! stage takes a verdict and returns a new one; the engine is a fold over
//! the ordered rule list, so there are no hidden mutation-order
//! dependencies. Later, more specific rules may veto earlier generic ones,
//! with one exception: the deterministic side-channel override is
//! authoritative and is never downgraded within the same pass.
//!
//! The engine never errors; a missing sub-assessment reads as "no
//! evidence". It is a pure function of its inputs, safe to invoke
//! concurrently across documents, and idempotent: a second pass over its
//! own output with the same side-channel input changes nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Classification;
use crate::core::Confidence;
use crate::core::Verdict;
use crate::runtime::sidechannel::SideChannelCheck;
use crate::runtime::sidechannel::SideChannelFinding;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Thresholds and vocabularies governing the rule fold.
///
/// # Invariants
/// - All confidence fields are already clamped to `[0, 100]`.
/// - Vocabulary matching is case-insensitive substring containment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Quality-note terms indicating degraded capture.
    pub low_quality_terms: Vec<String>,
    /// Visual tamper confidence above which degraded capture no longer
    /// excuses the signal (quality gate hard-evidence bound).
    pub quality_gate_tamper_max: Confidence,
    /// Visual confidence floor for confirmed tampering.
    pub tamper_confirm_floor: Confidence,
    /// Confidence cap applied by the phase-discipline downgrade.
    pub phase_discipline_cap: Confidence,
    /// Confidence cap applied by logical-only containment.
    pub logical_containment_cap: Confidence,
    /// Confidence floor below which weak signals are suppressed.
    pub weak_signal_floor: Confidence,
    /// Editing-tool fingerprints that count as hard visual proof.
    pub tool_fingerprints: Vec<String>,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            low_quality_terms: vec![
                "low".to_string(),
                "blurry".to_string(),
                "grainy".to_string(),
                "out of focus".to_string(),
                "poor scan".to_string(),
            ],
            quality_gate_tamper_max: Confidence::new(90),
            tamper_confirm_floor: Confidence::new(85),
            phase_discipline_cap: Confidence::new(70),
            logical_containment_cap: Confidence::new(75),
            weak_signal_floor: Confidence::new(90),
            tool_fingerprints: vec![
                "photoshop".to_string(),
                "gimp".to_string(),
                "clone stamp".to_string(),
                "content-aware".to_string(),
                "healing brush".to_string(),
                "affinity photo".to_string(),
            ],
        }
    }
}

// ============================================================================
// SECTION: Rule State
// ============================================================================

/// Verdict threaded through the rule fold.
///
/// # Invariants
/// - `hard_override` is set only by the side-channel rule and consulted by
///   every later rule in the same pass.
struct RuleState {
    /// Verdict as mutated by the rules applied so far.
    verdict: Verdict,
    /// Whether the deterministic side-channel override fired this pass.
    hard_override: bool,
}

/// Inputs shared by every rule in one pass.
struct RuleContext<'a> {
    /// Caller-supplied raw extracted text, when available.
    raw_text: Option<&'a str>,
    /// Policy thresholds and vocabularies.
    policy: &'a ReconcilePolicy,
    /// Ordered deterministic side-channel checks.
    checks: &'a [Box<dyn SideChannelCheck>],
}

/// A named rule stage in the fold.
type Rule = fn(RuleState, &RuleContext<'_>) -> RuleState;

/// The fixed rule order: broadest safety net first, the one hard override
/// second, then progressively stricter containment.
const RULES: &[Rule] = &[
    quality_gate,
    side_channel_override,
    phase_discipline,
    logical_containment,
    weak_signal_suppression,
];

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Reconciles a validated verdict into the authoritative verdict.
///
/// `raw_text` is the caller's out-of-band extracted text; the reasoning
/// service is not guaranteed to have honored it. The fallback ERROR verdict
/// must not be passed here; reconciliation applies only to validated
/// verdicts.
#[must_use]
pub fn reconcile(
    verdict: Verdict,
    raw_text: Option<&str>,
    policy: &ReconcilePolicy,
    checks: &[Box<dyn SideChannelCheck>],
) -> Verdict {
    let ctx = RuleContext {
        raw_text,
        policy,
        checks,
    };
    let state = RuleState {
        verdict,
        hard_override: false,
    };
    RULES.iter().fold(state, |state, rule| rule(state, &ctx)).verdict
}

// ============================================================================
// SECTION: Rule 1: Quality Gate
// ============================================================================

/// Degraded capture alone must never produce a positive forgery signal.
///
/// Fires when the quality note matches the low-quality vocabulary and no
/// hard evidence exists (no logical contradiction and visual tamper
/// confidence at or below the gate bound); forces ORIGINAL at full
/// confidence with the standard quality-insufficient summary.
fn quality_gate(mut state: RuleState, ctx: &RuleContext<'_>) -> RuleState {
    let Some(visual) = state.verdict.visual.as_ref() else {
        return state;
    };
    let note = visual.quality_note.to_ascii_lowercase();
    let low_quality = ctx.policy.low_quality_terms.iter().any(|term| note.contains(term.as_str()));
    if !low_quality {
        return state;
    }
    let hard_evidence = state.verdict.has_contradictions()
        || (visual.is_tampered && visual.confidence_score > ctx.policy.quality_gate_tamper_max);
    if hard_evidence {
        return state;
    }
    state.verdict.classification = Classification::Original;
    state.verdict.confidence = Confidence::MAX;
    state.verdict.summary = "Capture quality is insufficient to confirm tampering; no digital \
                             manipulation or logical errors were found."
        .to_string();
    state
}

// ============================================================================
// SECTION: Rule 2: Side-Channel Override
// ============================================================================

/// Confidence assigned by the deterministic override.
const OVERRIDE_CONFIDENCE: Confidence = Confidence::new(99);

/// Evaluates the deterministic checks against raw extracted text.
///
/// Any firing check forces FORGED at override confidence and replaces the
/// logical evidence with the specific triggered reasons. This result
/// encodes ground truth the model may lack; later rules in the same pass
/// never downgrade it.
fn side_channel_override(mut state: RuleState, ctx: &RuleContext<'_>) -> RuleState {
    let Some(text) = ctx.raw_text else {
        return state;
    };
    let findings: Vec<SideChannelFinding> =
        ctx.checks.iter().filter_map(|check| check.evaluate(text)).collect();
    if findings.is_empty() {
        return state;
    }
    let reasons: Vec<&str> = findings.iter().map(|finding| finding.reason.as_str()).collect();
    state.verdict.classification = Classification::Forged;
    state.verdict.confidence = OVERRIDE_CONFIDENCE;
    state.verdict.logical_evidence =
        findings.iter().map(|finding| finding.evidence.clone()).collect();
    state.verdict.summary =
        format!("Deterministic content checks confirm forgery: {}.", reasons.join("; "));
    state.hard_override = true;
    state
}

// ============================================================================
// SECTION: Rule 3: Phase Discipline
// ============================================================================

/// Rationale note appended when an illegitimate FORGED is downgraded.
const PHASE_DISCIPLINE_NOTE: &str =
    " Downgraded to SUSPICIOUS: no confirmed visual tampering supports a forgery finding.";

/// FORGED is illegitimate without confirmed visual tampering or the
/// side-channel override; illegitimate forgeries downgrade to SUSPICIOUS
/// with capped confidence and an appended rationale.
fn phase_discipline(mut state: RuleState, ctx: &RuleContext<'_>) -> RuleState {
    if state.hard_override || state.verdict.classification != Classification::Forged {
        return state;
    }
    if state.verdict.has_confirmed_tampering(ctx.policy.tamper_confirm_floor) {
        return state;
    }
    state.verdict.classification = Classification::Suspicious;
    state.verdict.confidence =
        state.verdict.confidence.capped_at(ctx.policy.phase_discipline_cap);
    state.verdict.summary.push_str(PHASE_DISCIPLINE_NOTE);
    state
}

// ============================================================================
// SECTION: Rule 4: Logical-Only Containment
// ============================================================================

/// Logic-only evidence never reaches FORGED: contradictions without
/// confirmed visual tampering cap the verdict at SUSPICIOUS.
fn logical_containment(mut state: RuleState, ctx: &RuleContext<'_>) -> RuleState {
    if state.hard_override {
        return state;
    }
    let logical_only = state.verdict.has_contradictions()
        && !state.verdict.has_confirmed_tampering(ctx.policy.tamper_confirm_floor);
    if !logical_only {
        return state;
    }
    if state.verdict.classification == Classification::Forged {
        state.verdict.classification = Classification::Suspicious;
    }
    state.verdict.confidence =
        state.verdict.confidence.capped_at(ctx.policy.logical_containment_cap);
    state
}

// ============================================================================
// SECTION: Rule 5: Weak-Signal Suppression
// ============================================================================

/// Positive verdicts lacking hard proof and falling below the confidence
/// floor are suppressed to ORIGINAL with a rewritten summary.
fn weak_signal_suppression(mut state: RuleState, ctx: &RuleContext<'_>) -> RuleState {
    if state.hard_override {
        return state;
    }
    let positive = matches!(
        state.verdict.classification,
        Classification::Suspicious | Classification::Forged
    );
    if !positive {
        return state;
    }
    if has_hard_proof(&state.verdict, ctx.policy) {
        return state;
    }
    if state.verdict.confidence >= ctx.policy.weak_signal_floor {
        return state;
    }
    state.verdict.classification = Classification::Original;
    state.verdict.summary = "Signals are too weak to support a forgery or suspicion finding; no \
                             hard proof was recorded."
        .to_string();
    state
}

/// Hard proof is a non-empty logical evidence entry or a visual evidence
/// item naming a recognized editing-tool fingerprint.
fn has_hard_proof(verdict: &Verdict, policy: &ReconcilePolicy) -> bool {
    if verdict.logical_evidence.iter().any(|item| !item.description.is_empty()) {
        return true;
    }
    verdict.visual_evidence.iter().any(|item| {
        let description = item.description.to_ascii_lowercase();
        policy.tool_fingerprints.iter().any(|tool| description.contains(tool.as_str()))
    })
}
