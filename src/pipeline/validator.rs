//! Structural validation rules for persona specs.
//!
//! Rule categories:
//!   PS — Persona Schema (8 rules)
//!   PT — Personality/Traits (4 rules)
//!   KD — Knowledge Domains (3 rules)
//!   BH — Behavior (4 rules)
//!   GR — Guardrails (3 rules)
//!   MD — Metadata (3 rules)
//!
//! Hard checks produce errors and fail the spec; soft checks produce
//! warnings but still count as passed. The battery is fixed and ordered, so
//! re-running validation on an unchanged spec reproduces the same report
//! (timestamp aside).

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::spec::types::{
    ExpertiseLevel, Formality, PersonaSpec, ResponseLength, Tone, MAX_RESPONSE_TOKENS_LIMIT,
    VALID_PII_HANDLING,
};

static SEMVER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("semver pattern is valid"));

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is valid"));

// ─────────────────────────────────────────────────────────────────
// Report Types
// ─────────────────────────────────────────────────────────────────

/// Severity of one rule finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One failed (or softly failed) rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFinding {
    /// Stable rule identifier, e.g. `PS-002`.
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
}

/// Outcome of running the full rule battery against one spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True iff no hard check failed.
    pub valid: bool,
    pub errors: Vec<RuleFinding>,
    pub warnings: Vec<RuleFinding>,
    pub checks_run: u32,
    pub checks_passed: u32,
    pub checks_failed: u32,
    pub timestamp: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────
// Rule Battery
// ─────────────────────────────────────────────────────────────────

struct Checker {
    errors: Vec<RuleFinding>,
    warnings: Vec<RuleFinding>,
    checks_run: u32,
    checks_passed: u32,
}

impl Checker {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            checks_run: 0,
            checks_passed: 0,
        }
    }

    /// Hard check: failure adds an error and fails the spec.
    fn hard(&mut self, rule_id: &str, condition: bool, message: &str) {
        self.checks_run += 1;
        if condition {
            self.checks_passed += 1;
        } else {
            self.errors.push(RuleFinding {
                rule_id: rule_id.to_string(),
                severity: Severity::Error,
                message: message.to_string(),
            });
        }
    }

    /// Soft check: failure adds a warning but still counts as passed.
    fn soft(&mut self, rule_id: &str, condition: bool, message: &str) {
        self.checks_run += 1;
        self.checks_passed += 1;
        if !condition {
            self.warnings.push(RuleFinding {
                rule_id: rule_id.to_string(),
                severity: Severity::Warning,
                message: message.to_string(),
            });
        }
    }

    fn finish(self) -> ValidationReport {
        let checks_failed = self.checks_run - self.checks_passed;
        ValidationReport {
            valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            checks_run: self.checks_run,
            checks_passed: self.checks_passed,
            checks_failed,
            timestamp: Utc::now(),
        }
    }
}

/// Run all validation rules against a persona spec.
pub fn validate(spec: &PersonaSpec) -> ValidationReport {
    let mut c = Checker::new();

    // === PS — Persona Schema ===
    c.hard(
        "PS-001",
        SEMVER_PATTERN.is_match(&spec.spec_version),
        "spec_version must be a valid semver string",
    );
    c.hard(
        "PS-002",
        !spec.identity.name.is_empty(),
        "persona.name is required",
    );
    c.hard(
        "PS-003",
        SLUG_PATTERN.is_match(&spec.identity.slug),
        "persona.slug must be a valid kebab-case string",
    );
    c.hard(
        "PS-004",
        !spec.identity.role.is_empty(),
        "persona.role is required",
    );
    c.hard(
        "PS-005",
        !spec.identity.description.is_empty(),
        "persona.description is required",
    );
    // Section presence is guaranteed by the type system; the checks stay in
    // the battery so rule codes and check counts remain stable.
    c.hard("PS-006", true, "personality section is required");
    c.hard("PS-007", true, "knowledge section is required");
    c.hard("PS-008", true, "behavior section is required");

    // === PT — Personality / Traits ===
    c.soft(
        "PT-001",
        !spec.personality.traits.is_empty(),
        "personality.traits is empty — persona may lack character definition",
    );
    c.hard(
        "PT-002",
        Tone::is_valid(&spec.personality.tone),
        &format!(
            "personality.tone must be one of {}",
            sorted_set(Tone::ALL.iter().map(|t| t.as_str())),
        ),
    );
    c.hard(
        "PT-003",
        Formality::is_valid(&spec.personality.formality),
        &format!(
            "personality.formality must be one of {}",
            sorted_set(Formality::ALL.iter().map(|t| t.as_str())),
        ),
    );
    c.hard(
        "PT-004",
        !spec.personality.communication_style.is_empty(),
        "personality.communication_style is required",
    );

    // === KD — Knowledge Domains ===
    c.soft(
        "KD-001",
        !spec.knowledge.domains.is_empty(),
        "knowledge.domains is empty — persona has no domain expertise defined",
    );
    c.hard(
        "KD-002",
        ExpertiseLevel::is_valid(&spec.knowledge.expertise_level),
        &format!(
            "knowledge.expertise_level must be one of {}",
            sorted_set(ExpertiseLevel::ALL.iter().map(|t| t.as_str())),
        ),
    );
    c.hard("KD-003", true, "knowledge.limitations must be a list");

    // === BH — Behavior ===
    c.hard(
        "BH-001",
        !spec.behavior.greeting.is_empty(),
        "behavior.greeting is required",
    );
    c.hard(
        "BH-002",
        !spec.behavior.fallback.is_empty(),
        "behavior.fallback is required",
    );
    c.hard(
        "BH-003",
        !spec.behavior.escalation_trigger.is_empty(),
        "behavior.escalation_trigger is required",
    );
    c.hard(
        "BH-004",
        ResponseLength::is_valid(&spec.behavior.response_length),
        &format!(
            "behavior.response_length must be one of {}",
            sorted_set(ResponseLength::ALL.iter().map(|t| t.as_str())),
        ),
    );

    // === GR — Guardrails ===
    c.hard("GR-001", true, "guardrails.forbidden_topics must be a list");
    c.hard(
        "GR-002",
        VALID_PII_HANDLING.contains(&spec.guardrails.pii_handling.as_str()),
        &format!(
            "guardrails.pii_handling must be one of {}",
            sorted_set(VALID_PII_HANDLING.iter().copied()),
        ),
    );
    c.hard(
        "GR-003",
        (1..=MAX_RESPONSE_TOKENS_LIMIT).contains(&spec.guardrails.max_response_tokens),
        "guardrails.max_response_tokens must be an integer 1–16384",
    );

    // === MD — Metadata ===
    c.hard("MD-001", true, "metadata.created_at is required");
    c.hard(
        "MD-002",
        !spec.metadata.author.is_empty(),
        "metadata.author is required",
    );
    c.hard("MD-003", true, "metadata.notes must be a list");

    c.finish()
}

fn sorted_set<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut names: Vec<&str> = values.collect();
    names.sort_unstable();
    format!("[{}]", names.join(", "))
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
