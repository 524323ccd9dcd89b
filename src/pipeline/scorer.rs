//! Confidence scoring for persona builds.
//!
//! Produces a weighted score and letter grade describing how complete and
//! well-defined a persona spec is. Four independently weighted sub-scores:
//! validation results (30%), spec completeness (30%), test coverage (20%)
//! and guardrail strength (20%). Pure and order-independent: identical
//! inputs reproduce an identical breakdown, including flag ordering.

use serde::{Deserialize, Serialize};

use crate::pipeline::validator::ValidationReport;
use crate::spec::types::{PersonaSpec, MAX_RESPONSE_TOKENS_LIMIT, VALID_PII_HANDLING};

const VALIDATION_WEIGHT: f64 = 0.30;
const COMPLETENESS_WEIGHT: f64 = 0.30;
const COVERAGE_WEIGHT: f64 = 0.20;
const GUARDRAIL_WEIGHT: f64 = 0.20;

/// Full coverage is reached at this many test scenarios.
const FULL_COVERAGE_SCENARIOS: u32 = 8;

/// Fewer scenarios than this is flagged.
const MIN_EXPECTED_SCENARIOS: u32 = 5;

// ─────────────────────────────────────────────────────────────────
// Report Types
// ─────────────────────────────────────────────────────────────────

/// Severity of a confidence flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
}

/// One observation that lowers reviewer confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub severity: FlagSeverity,
    pub message: String,
}

/// Letter grade derived from the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Grade thresholds in descending order; the first threshold the score
    /// meets or exceeds wins.
    const THRESHOLDS: &'static [(f64, Grade)] = &[
        (0.90, Grade::A),
        (0.80, Grade::B),
        (0.65, Grade::C),
        (0.50, Grade::D),
        (0.00, Grade::F),
    ];

    /// Assign a grade to a score in [0, 1].
    pub fn for_score(score: f64) -> Grade {
        for (threshold, grade) in Grade::THRESHOLDS {
            if score >= *threshold {
                return *grade;
            }
        }
        Grade::F
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One weighted scoring category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub weight: f64,
    pub raw_score: f64,
    pub weighted_score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields_present: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks_passed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks_total: Option<u32>,
}

impl CategoryScore {
    fn new(weight: f64, raw_score: f64) -> Self {
        Self {
            weight,
            raw_score: round4(raw_score),
            weighted_score: round4(raw_score * weight),
            fields_present: None,
            fields_total: None,
            scenarios: None,
            checks_passed: None,
            checks_total: None,
        }
    }
}

/// Per-category score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub validation: CategoryScore,
    pub completeness: CategoryScore,
    pub test_coverage: CategoryScore,
    pub guardrails: CategoryScore,
}

/// Confidence report for one persona build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceReport {
    /// Weighted score in [0, 1], rounded to 4 decimal places.
    pub score: f64,
    pub grade: Grade,
    pub breakdown: ScoreBreakdown,
    pub flags: Vec<Flag>,
    /// Subset of `flags` with high severity.
    pub high_severity_flags: Vec<Flag>,
}

// ─────────────────────────────────────────────────────────────────
// Scoring
// ─────────────────────────────────────────────────────────────────

/// Calculate the confidence score for a persona build.
///
/// `scenario_count` is supplied by the test-suite generator (or any other
/// scenario provider the caller wires in).
pub fn score(
    spec: &PersonaSpec,
    validation: &ValidationReport,
    scenario_count: u32,
) -> ConfidenceReport {
    let mut flags = Vec::new();

    // --- 1. Validation score (30%) ---
    let validation_ratio =
        f64::from(validation.checks_passed) / f64::from(validation.checks_run.max(1));

    if !validation.valid {
        flags.push(Flag {
            severity: FlagSeverity::High,
            message: format!(
                "Validation failed with {} errors",
                validation.errors.len()
            ),
        });
    }
    if !validation.warnings.is_empty() {
        flags.push(Flag {
            severity: FlagSeverity::Low,
            message: format!("Validation has {} warning(s)", validation.warnings.len()),
        });
    }

    let validation_cat = CategoryScore::new(VALIDATION_WEIGHT, validation_ratio);

    // --- 2. Spec completeness (30%) ---
    // Fixed 13-field checklist spanning identity, personality, knowledge,
    // behavior and guardrails.
    let checklist: [(&str, bool); 13] = [
        ("persona.name", !spec.identity.name.is_empty()),
        ("persona.role", !spec.identity.role.is_empty()),
        ("persona.description", !spec.identity.description.is_empty()),
        ("personality.traits", !spec.personality.traits.is_empty()),
        ("personality.tone", !spec.personality.tone.is_empty()),
        (
            "personality.communication_style",
            !spec.personality.communication_style.is_empty(),
        ),
        ("knowledge.domains", !spec.knowledge.domains.is_empty()),
        (
            "knowledge.expertise_level",
            !spec.knowledge.expertise_level.is_empty(),
        ),
        ("behavior.greeting", !spec.behavior.greeting.is_empty()),
        ("behavior.fallback", !spec.behavior.fallback.is_empty()),
        (
            "behavior.escalation_trigger",
            !spec.behavior.escalation_trigger.is_empty(),
        ),
        (
            "guardrails.forbidden_topics",
            !spec.guardrails.forbidden_topics.is_empty(),
        ),
        (
            "guardrails.pii_handling",
            !spec.guardrails.pii_handling.is_empty(),
        ),
    ];

    let fields_total = checklist.len() as u32;
    let mut fields_present = 0u32;
    for (field_name, present) in &checklist {
        if *present {
            fields_present += 1;
        } else {
            let severity = if field_name.contains("name") || field_name.contains("role") {
                FlagSeverity::Medium
            } else {
                FlagSeverity::Low
            };
            flags.push(Flag {
                severity,
                message: format!("{} is missing or empty", field_name),
            });
        }
    }

    let completeness_ratio = f64::from(fields_present) / f64::from(fields_total.max(1));
    let mut completeness_cat = CategoryScore::new(COMPLETENESS_WEIGHT, completeness_ratio);
    completeness_cat.fields_present = Some(fields_present);
    completeness_cat.fields_total = Some(fields_total);

    // --- 3. Test coverage (20%) ---
    let coverage_ratio =
        (f64::from(scenario_count) / f64::from(FULL_COVERAGE_SCENARIOS)).min(1.0);

    if scenario_count < MIN_EXPECTED_SCENARIOS {
        flags.push(Flag {
            severity: FlagSeverity::Medium,
            message: format!(
                "Only {} test scenarios generated (expected {}-{})",
                scenario_count, MIN_EXPECTED_SCENARIOS, FULL_COVERAGE_SCENARIOS
            ),
        });
    }

    let mut coverage_cat = CategoryScore::new(COVERAGE_WEIGHT, coverage_ratio);
    coverage_cat.scenarios = Some(scenario_count);

    // --- 4. Guardrail strength (20%) ---
    let guardrail_checks: [bool; 5] = [
        !spec.guardrails.forbidden_topics.is_empty(),
        VALID_PII_HANDLING.contains(&spec.guardrails.pii_handling.as_str()),
        (1..=MAX_RESPONSE_TOKENS_LIMIT).contains(&spec.guardrails.max_response_tokens),
        !spec.behavior.escalation_trigger.is_empty(),
        !spec.behavior.fallback.is_empty(),
    ];
    let guardrail_total = guardrail_checks.len() as u32;
    let guardrail_passed = guardrail_checks.iter().filter(|passed| **passed).count() as u32;
    let guardrail_ratio = f64::from(guardrail_passed) / f64::from(guardrail_total.max(1));

    if guardrail_ratio < 0.6 {
        flags.push(Flag {
            severity: FlagSeverity::High,
            message: "Weak guardrails — fewer than 60% of safety checks pass".to_string(),
        });
    }

    let mut guardrail_cat = CategoryScore::new(GUARDRAIL_WEIGHT, guardrail_ratio);
    guardrail_cat.checks_passed = Some(guardrail_passed);
    guardrail_cat.checks_total = Some(guardrail_total);

    // --- Final score ---
    let total = validation_ratio * VALIDATION_WEIGHT
        + completeness_ratio * COMPLETENESS_WEIGHT
        + coverage_ratio * COVERAGE_WEIGHT
        + guardrail_ratio * GUARDRAIL_WEIGHT;
    let total = round4(total.min(1.0));

    let high_severity_flags = flags
        .iter()
        .filter(|f| f.severity == FlagSeverity::High)
        .cloned()
        .collect();

    ConfidenceReport {
        score: total,
        grade: Grade::for_score(total),
        breakdown: ScoreBreakdown {
            validation: validation_cat,
            completeness: completeness_cat,
            test_coverage: coverage_cat,
            guardrails: guardrail_cat,
        },
        flags,
        high_severity_flags,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
