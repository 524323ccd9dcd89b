//! Build orchestration: wires the pipeline stages together.
//!
//! [`PersonaBuilder`] is the crate's front door: it runs the pure pipeline
//! (normalize → validate → generate → score), gates on the validation and
//! confidence results, and only then touches shared state by allocating a
//! version and packaging the delivery. Assessment runs the same stages but
//! writes nothing.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::BuilderConfig;
use crate::delivery::{package_delivery, BuildArtifacts, DeliveryPack};
use crate::error::Result;
use crate::generate::{claude_config, generate_system_prompt, generate_test_suite, openai_config};
use crate::generate::test_suite::TestSuite;
use crate::pipeline::scorer::{score, ConfidenceReport, Flag};
use crate::pipeline::validator::{validate, RuleFinding, ValidationReport};
use crate::pipeline::normalizer::normalize;
use crate::spec::{PersonaSpec, RawPersona};
use crate::versioning::{DirVersionStore, VersionAllocator};

// ─────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────

/// Dry-run result: full pipeline output with nothing written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub persona_name: String,
    pub persona_slug: String,
    pub spec_valid: bool,
    pub validation: ValidationReport,
    pub confidence: ConfidenceReport,
    pub test_scenarios: u32,
    pub spec: PersonaSpec,
}

/// Why a build was not packaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRejection {
    pub reason: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<RuleFinding>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<RuleFinding>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub flags: Vec<Flag>,
}

/// A completed, packaged build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub persona_name: String,
    pub slug: String,
    pub version: u32,
    pub confidence_score: f64,
    pub confidence_grade: String,
    pub spec_valid: bool,
    pub test_scenarios: u32,
    pub pack: DeliveryPack,
}

/// Outcome of one build request.
///
/// Validation failure is data, not an error: callers branch on the
/// variant. `Err` is reserved for infrastructure failures (lock timeout,
/// store unavailable, IO).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BuildOutcome {
    Built(BuildReport),
    Rejected(BuildRejection),
}

// ─────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────

/// Runs persona builds against one output tree.
pub struct PersonaBuilder {
    config: BuilderConfig,
    allocator: VersionAllocator<DirVersionStore>,
}

impl PersonaBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        let store = DirVersionStore::new(config.output_root());
        let allocator = VersionAllocator::with_lock_timeout(store, config.lock_timeout());
        Self { config, allocator }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Assess a raw persona definition without writing anything.
    pub fn assess(&self, raw: &RawPersona) -> Assessment {
        let raw = self.with_default_author(raw);
        let spec = normalize(&raw, None);
        let validation = validate(&spec);
        let prompt = generate_system_prompt(&spec);
        let suite = generate_test_suite(&spec, &prompt);
        let confidence = score(&spec, &validation, suite.total_scenarios);

        Assessment {
            persona_name: spec.identity.name.clone(),
            persona_slug: spec.identity.slug.clone(),
            spec_valid: validation.valid,
            test_scenarios: suite.total_scenarios,
            validation,
            confidence,
            spec,
        }
    }

    /// Generate the test suite for a persona without building.
    pub fn test_suite(&self, raw: &RawPersona) -> TestSuite {
        let raw = self.with_default_author(raw);
        let spec = normalize(&raw, None);
        let prompt = generate_system_prompt(&spec);
        generate_test_suite(&spec, &prompt)
    }

    /// Run the full build pipeline and package the delivery.
    ///
    /// The version is allocated only after validation and the confidence
    /// gate pass, so rejected builds never consume a version number.
    pub fn build(&self, raw: &RawPersona) -> Result<BuildOutcome> {
        let raw = self.with_default_author(raw);
        let spec = normalize(&raw, None);
        let validation = validate(&spec);
        let prompt = generate_system_prompt(&spec);
        let oai = openai_config(&spec, &prompt);
        let claude = claude_config(&spec, &prompt);
        let suite = generate_test_suite(&spec, &prompt);
        let confidence = score(&spec, &validation, suite.total_scenarios);

        if !validation.valid {
            warn!(
                persona = %spec.identity.slug,
                errors = validation.errors.len(),
                "Build rejected: validation failed"
            );
            return Ok(BuildOutcome::Rejected(BuildRejection {
                reason: "Validation failed".to_string(),
                errors: validation.errors,
                warnings: validation.warnings,
                flags: Vec::new(),
            }));
        }

        let min_confidence = self.config.builder.min_confidence;
        if confidence.score < min_confidence {
            warn!(
                persona = %spec.identity.slug,
                score = confidence.score,
                min_confidence,
                "Build rejected: confidence too low"
            );
            return Ok(BuildOutcome::Rejected(BuildRejection {
                reason: format!(
                    "Confidence too low ({} < {})",
                    confidence.score, min_confidence
                ),
                errors: Vec::new(),
                warnings: Vec::new(),
                flags: confidence.flags,
            }));
        }

        let slug = spec.identity.slug.clone();
        let version = self.allocator.allocate_next(&slug)?;

        let pack = package_delivery(
            &slug,
            version,
            &BuildArtifacts {
                spec: &spec,
                system_prompt: &prompt,
                openai_config: &oai,
                claude_config: &claude,
                validation: &validation,
                confidence: &confidence,
                test_suite: &suite,
            },
            &self.config.output_root(),
        )?;

        info!(
            persona = %slug,
            version,
            score = confidence.score,
            grade = %confidence.grade,
            "Persona built"
        );

        Ok(BuildOutcome::Built(BuildReport {
            persona_name: spec.identity.name.clone(),
            slug,
            version,
            confidence_score: confidence.score,
            confidence_grade: confidence.grade.as_str().to_string(),
            spec_valid: validation.valid,
            test_scenarios: suite.total_scenarios,
            pack,
        }))
    }

    fn with_default_author(&self, raw: &RawPersona) -> RawPersona {
        let mut raw = raw.clone();
        if raw.author.is_none() {
            raw.author = self.config.builder.default_author.clone();
        }
        raw
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
