// crates/veridoc-core/src/runtime/sidechannel.rs
// ============================================================================
// Module: Veridoc Side-Channel Checks
// Description: Deterministic pattern checks over caller-supplied raw text.
// Purpose: Encode ground truth the reasoning service may lack or ignore.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Side-channel checks run against raw extracted text that the caller holds
//! out-of-band; the reasoning service is not guaranteed to have honored
//! that text. Checks form a pluggable ordered list of (pattern predicate,
//! evidence producer) pairs evaluated deterministically. The two defaults
//! here (conflicting month-year period references and decimal amounts
//! lacking a currency marker) demonstrate the override mechanism; deploys
//! swap in their own document-class checks behind [`SideChannelCheck`].
//!
//! All scans are plain string walks with no backtracking; a check either
//! fires with a specific recorded reason or stays silent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::EvidenceItem;
use crate::core::Severity;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Month names recognized by the period-conflict scan.
const MONTH_NAMES: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Currency symbols recognized as amount markers.
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₺'];

/// Currency codes recognized as amount markers.
const CURRENCY_CODES: &[&str] = &["USD", "EUR", "GBP", "JPY", "TRY", "CHF", "CAD", "AUD"];

/// Year bounds accepted by the period-conflict scan.
const YEAR_RANGE: (u32, u32) = (1900, 2100);

// ============================================================================
// SECTION: Check Contract
// ============================================================================

/// A single fired side-channel check with its recorded reason.
///
/// # Invariants
/// - `reason` names the specific triggered pattern, never a generic label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideChannelFinding {
    /// Identifier of the check that fired.
    pub check_id: &'static str,
    /// Specific recorded reason for the override.
    pub reason: String,
    /// Evidence item describing the finding.
    pub evidence: EvidenceItem,
}

/// Deterministic pattern check over raw extracted text.
///
/// Implementations must be pure functions of the text: evaluating the same
/// text twice yields the same outcome, which the reconciliation engine
/// relies on for idempotence.
pub trait SideChannelCheck: Send + Sync {
    /// Stable identifier for the check.
    fn id(&self) -> &'static str;

    /// Evaluates the check, returning a finding when the pattern fires.
    fn evaluate(&self, text: &str) -> Option<SideChannelFinding>;
}

/// Returns the default ordered check list.
#[must_use]
pub fn default_side_channel_checks() -> Vec<Box<dyn SideChannelCheck>> {
    vec![Box::new(ConflictingPeriodCheck), Box::new(UnmarkedAmountCheck)]
}

// ============================================================================
// SECTION: Conflicting Period Check
// ============================================================================

/// Fires when the text references two mutually incompatible month-year
/// periods.
///
/// A document describing a single statement period must not reference two
/// distinct `Month YYYY` pairs; two such pairs are a logical contradiction
/// regardless of what the reasoning service concluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictingPeriodCheck;

impl SideChannelCheck for ConflictingPeriodCheck {
    fn id(&self) -> &'static str {
        "conflicting-period"
    }

    fn evaluate(&self, text: &str) -> Option<SideChannelFinding> {
        let periods = collect_period_references(text);
        if periods.len() < 2 {
            return None;
        }
        let first = format_period(periods[0]);
        let second = format_period(periods[1]);
        let reason =
            format!("document references incompatible periods: {first} vs {second}");
        Some(SideChannelFinding {
            check_id: "conflicting-period",
            reason: reason.clone(),
            evidence: EvidenceItem::new("date_contradiction", reason, Severity::High),
        })
    }
}

/// Collects distinct `Month YYYY` references in discovery order.
fn collect_period_references(text: &str) -> Vec<(usize, u32)> {
    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .collect();
    let mut periods: Vec<(usize, u32)> = Vec::new();
    for window in tokens.windows(2) {
        let Some(month) = month_index(window[0]) else {
            continue;
        };
        let Some(year) = parse_year(window[1]) else {
            continue;
        };
        if !periods.contains(&(month, year)) {
            periods.push((month, year));
        }
    }
    periods
}

/// Resolves a token to a month index when it names a month.
fn month_index(token: &str) -> Option<usize> {
    let lowered = token.to_ascii_lowercase();
    MONTH_NAMES.iter().position(|name| *name == lowered)
}

/// Parses a token as a plausible 4-digit year.
fn parse_year(token: &str) -> Option<u32> {
    if token.len() != 4 {
        return None;
    }
    let year: u32 = token.parse().ok()?;
    (YEAR_RANGE.0..=YEAR_RANGE.1).contains(&year).then_some(year)
}

/// Formats a period reference for the recorded reason.
fn format_period(period: (usize, u32)) -> String {
    let (month, year) = period;
    let name = MONTH_NAMES.get(month).copied().unwrap_or("unknown");
    let mut label = name.to_string();
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!("{label} {year}")
}

// ============================================================================
// SECTION: Unmarked Amount Check
// ============================================================================

/// Fires when a decimal amount lacks an expected currency marker.
///
/// Financial documents mark amounts with a symbol or code adjacent to the
/// number; a two-decimal amount with no marker in its own or neighboring
/// tokens indicates pasted or reconstructed content.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnmarkedAmountCheck;

impl SideChannelCheck for UnmarkedAmountCheck {
    fn id(&self) -> &'static str {
        "unmarked-amount"
    }

    fn evaluate(&self, text: &str) -> Option<SideChannelFinding> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        for (index, token) in tokens.iter().enumerate() {
            let trimmed = token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != ',');
            if !is_decimal_amount(trimmed) {
                continue;
            }
            if has_currency_marker(&tokens, index) {
                continue;
            }
            let reason = format!("amount {trimmed} carries no currency marker");
            return Some(SideChannelFinding {
                check_id: "unmarked-amount",
                reason: reason.clone(),
                evidence: EvidenceItem::new("unmarked_amount", reason, Severity::High),
            });
        }
        None
    }
}

/// Returns true for digit groups ending in a two-decimal fraction.
fn is_decimal_amount(token: &str) -> bool {
    let Some((integral, fraction)) = token.rsplit_once('.') else {
        return false;
    };
    if fraction.len() != 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    !integral.is_empty()
        && integral.bytes().all(|b| b.is_ascii_digit() || b == b',')
        && integral.bytes().any(|b| b.is_ascii_digit())
}

/// Checks the token itself and both neighbors for a currency marker.
fn has_currency_marker(tokens: &[&str], index: usize) -> bool {
    let start = index.saturating_sub(1);
    let end = (index + 1).min(tokens.len() - 1);
    tokens[start..=end].iter().any(|token| {
        token.chars().any(|c| CURRENCY_SYMBOLS.contains(&c))
            || CURRENCY_CODES.contains(
                &token.trim_matches(|c: char| !c.is_ascii_alphabetic()).to_ascii_uppercase().as_str(),
            )
    })
}
