// crates/veridoc-core/tests/sidechannel_scenarios.rs
// ============================================================================
// Module: Side-Channel Scenario Tests
// Description: Validate deterministic overrides from raw extracted text.
// Purpose: Ensure ground-truth checks overrule the model classification.
// Dependencies: veridoc-core
// ============================================================================

//! Deterministic override tests: the side-channel rule is authoritative
//! regardless of what the reasoning service concluded.

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
use veridoc_core::ReconcilePolicy;
use veridoc_core::SideChannelCheck;
use veridoc_core::Verdict;
use veridoc_core::default_side_channel_checks;
use veridoc_core::reconcile;
use veridoc_core::runtime::ConflictingPeriodCheck;
use veridoc_core::runtime::UnmarkedAmountCheck;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Model verdict insisting the document is clean.
fn clean_verdict() -> Verdict {
    Verdict {
        classification: Classification::Original,
        confidence: Confidence::new(97),
        visual: None,
        logical: None,
        visual_evidence: Vec::new(),
        logical_evidence: Vec::new(),
        metadata_evidence: Vec::new(),
        document_type: Some("invoice".to_string()),
        summary: "No anomalies found.".to_string(),
        reasoning: None,
    }
}

// ============================================================================
// SECTION: Individual Checks
// ============================================================================

#[test]
fn conflicting_periods_fire_on_two_month_year_pairs() {
    let check = ConflictingPeriodCheck;
    let finding = check
        .evaluate("Billing period: March 2024. Payment received April 2024 for the same period.");
    let finding = finding.unwrap();
    assert_eq!(finding.check_id, "conflicting-period");
    assert!(finding.reason.contains("March 2024"));
    assert!(finding.reason.contains("April 2024"));
}

#[test]
fn single_period_stays_silent() {
    let check = ConflictingPeriodCheck;
    assert!(check.evaluate("Statement for March 2024, issued in March 2024.").is_none());
}

#[test]
fn unmarked_amount_fires_without_currency_marker() {
    let check = UnmarkedAmountCheck;
    let finding = check.evaluate("Total due: 1,499.00 by end of month.").unwrap();
    assert_eq!(finding.check_id, "unmarked-amount");
    assert!(finding.reason.contains("1,499.00"));
}

#[test]
fn marked_amounts_stay_silent() {
    let check = UnmarkedAmountCheck;
    assert!(check.evaluate("Total due: $1,499.00 by end of month.").is_none());
    assert!(check.evaluate("Total due: 1,499.00 EUR by end of month.").is_none());
}

// ============================================================================
// SECTION: Override Behavior
// ============================================================================

#[test]
fn override_forces_forged_over_a_clean_model_verdict() {
    let text = "Invoice period May 2024. Interest accrued June 2024. Amount payable 2,350.00 \
                within 30 days.";
    let out = reconcile(
        clean_verdict(),
        Some(text),
        &ReconcilePolicy::default(),
        &default_side_channel_checks(),
    );
    assert_eq!(out.classification, Classification::Forged);
    assert_eq!(out.confidence.get(), 99);
    assert!(!out.logical_evidence.is_empty());
    assert!(out.logical_evidence[0].description.contains("May 2024"));
    assert!(out.summary.contains("Deterministic content checks"));
}

#[test]
fn override_is_not_downgraded_by_later_rules() {
    // No visual tampering confirmation exists, which would normally forbid
    // FORGED; the override is exempt from phase discipline.
    let text = "Period January 2025 and also February 2025.";
    let out = reconcile(
        clean_verdict(),
        Some(text),
        &ReconcilePolicy::default(),
        &default_side_channel_checks(),
    );
    assert_eq!(out.classification, Classification::Forged);
    assert_eq!(out.confidence.get(), 99);
}

#[test]
fn no_raw_text_disables_the_override() {
    let out = reconcile(
        clean_verdict(),
        None,
        &ReconcilePolicy::default(),
        &default_side_channel_checks(),
    );
    assert_eq!(out.classification, Classification::Original);
}

#[test]
fn clean_text_leaves_the_verdict_untouched() {
    let text = "Statement for March 2024. Total due: $120.00.";
    let out = reconcile(
        clean_verdict(),
        Some(text),
        &ReconcilePolicy::default(),
        &default_side_channel_checks(),
    );
    assert_eq!(out.classification, Classification::Original);
    assert_eq!(out.confidence.get(), 97);
}
