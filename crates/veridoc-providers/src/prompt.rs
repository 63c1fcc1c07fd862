// crates/veridoc-providers/src/prompt.rs
// ============================================================================
// Module: Forensics Prompt Builder
// Description: Reasoning request construction for forgery analysis.
// Purpose: Assemble the instruction prompt around extracted content.
// Dependencies: veridoc-core
// ============================================================================

//! ## Overview
//! The prompt builder assembles the outbound reasoning request. Prompt
//! wording is configuration, not logic: the core never branches on it, and
//! deployments override the instruction template wholesale. The default
//! template demands strict JSON output in the shape the schema validator
//! expects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use veridoc_core::DocumentPart;
use veridoc_core::ExtractedContent;
use veridoc_core::ReasoningRequest;
use veridoc_core::RequestBuilder;

// ============================================================================
// SECTION: Default Template
// ============================================================================

/// Default forensic instruction template.
const DEFAULT_INSTRUCTIONS: &str = "You are a professional document fraud detection expert.

Your task is to analyze the attached document and determine whether it is
ORIGINAL, SUSPICIOUS, or FORGED.

Analyze carefully for:
- Language consistency
- Formatting anomalies
- Logical contradictions
- Date and number inconsistencies
- Signs of copy-paste or digital tampering
- Unnatural repetitions or spacing

IMPORTANT RULES:
- Do NOT guess beyond the document content
- If evidence is weak, classify as SUSPICIOUS
- Do NOT claim legal certainty

Respond ONLY with a single JSON object containing: visual_assessment
(is_tampered, confidence_score, artifacts, quality_note),
logical_assessment (has_contradictions, confidence_score, math_errors,
date_issues), classification, confidence, summary, reasoning.";

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds forensic reasoning requests from a configurable template.
///
/// # Invariants
/// - The template is opaque to the core; only its placement is fixed.
#[derive(Debug, Clone)]
pub struct ForensicsPromptBuilder {
    /// Instruction template placed ahead of the extracted text.
    instructions: String,
}

impl Default for ForensicsPromptBuilder {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

impl ForensicsPromptBuilder {
    /// Creates a builder with a custom instruction template.
    #[must_use]
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    /// Creates a builder from an optional override, falling back to the
    /// default template.
    #[must_use]
    pub fn from_override(instructions: Option<&str>) -> Self {
        instructions.map_or_else(Self::default, Self::new)
    }
}

impl RequestBuilder for ForensicsPromptBuilder {
    fn build(&self, content: &ExtractedContent, document: DocumentPart) -> ReasoningRequest {
        let prompt = if content.text.is_empty() {
            self.instructions.clone()
        } else {
            format!(
                "{}\n\nExtracted document text:\n\"\"\"\n{}\n\"\"\"",
                self.instructions, content.text
            )
        };
        ReasoningRequest {
            prompt,
            document,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
