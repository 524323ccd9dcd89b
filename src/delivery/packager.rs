//! Persona delivery packager.
//!
//! Writes every artifact of one build under
//! `<output_root>/<slug>/v<version>/` and emits a delivery-pack index with
//! sha256 checksums of each file, so downstream consumers can detect
//! tampered or truncated artifacts without re-running the pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::generate::platform::{ClaudeConfig, OpenAiConfig};
use crate::generate::test_suite::TestSuite;
use crate::pipeline::scorer::ConfidenceReport;
use crate::pipeline::validator::ValidationReport;
use crate::spec::PersonaSpec;

// ─────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────

/// Everything one build produced, ready to be written out.
pub struct BuildArtifacts<'a> {
    pub spec: &'a PersonaSpec,
    pub system_prompt: &'a str,
    pub openai_config: &'a OpenAiConfig,
    pub claude_config: &'a ClaudeConfig,
    pub validation: &'a ValidationReport,
    pub confidence: &'a ConfidenceReport,
    pub test_suite: &'a TestSuite,
}

/// Index of one packaged delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPack {
    pub slug: String,
    pub version: u32,
    pub version_str: String,
    pub persona_name: String,
    pub persona_role: String,
    pub output_dir: PathBuf,
    /// Artifact file names in write order.
    pub files: Vec<String>,
    /// sha256 hex digest per artifact file.
    pub checksums: BTreeMap<String, String>,
    pub confidence_score: f64,
    pub confidence_grade: String,
    pub spec_valid: bool,
    pub total_test_scenarios: u32,
    /// Unique id for this packaging run.
    pub build_id: Uuid,
}

// ─────────────────────────────────────────────────────────────────
// Packager
// ─────────────────────────────────────────────────────────────────

struct Writer {
    output_dir: PathBuf,
    files: Vec<String>,
    checksums: BTreeMap<String, String>,
}

impl Writer {
    fn write_text(&mut self, filename: &str, text: &str) -> Result<()> {
        let path = self.output_dir.join(filename);
        fs::write(&path, text).map_err(|e| Error::io_write(path, e))?;
        self.checksums
            .insert(filename.to_string(), hex_digest(text.as_bytes()));
        self.files.push(filename.to_string());
        Ok(())
    }

    fn write_json<T: Serialize>(&mut self, filename: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_text(filename, &json)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Package all artifacts of one build into its version directory.
///
/// The version directory normally exists already; the allocator creates
/// it when the version number is claimed.
pub fn package_delivery(
    slug: &str,
    version: u32,
    artifacts: &BuildArtifacts<'_>,
    output_root: &Path,
) -> Result<DeliveryPack> {
    let version_str = format!("v{}", version);
    let output_dir = output_root.join(slug).join(&version_str);
    fs::create_dir_all(&output_dir).map_err(|e| Error::io_write(output_dir.clone(), e))?;

    let mut writer = Writer {
        output_dir: output_dir.clone(),
        files: Vec::new(),
        checksums: BTreeMap::new(),
    };

    writer.write_json("persona_spec.json", artifacts.spec)?;
    writer.write_text("system_prompt.txt", artifacts.system_prompt)?;
    writer.write_json("openai_config.json", artifacts.openai_config)?;
    writer.write_json("claude_config.json", artifacts.claude_config)?;
    writer.write_json("validation_report.json", artifacts.validation)?;
    writer.write_json("confidence.json", artifacts.confidence)?;
    writer.write_json("test_suite.json", artifacts.test_suite)?;

    let summary = render_summary(slug, &version_str, artifacts, &writer.files);
    writer.write_text("delivery_summary.md", &summary)?;

    // The pack indexes itself: its own file name is part of the listing
    let mut files = writer.files.clone();
    files.push("delivery_pack.json".to_string());

    let pack = DeliveryPack {
        slug: slug.to_string(),
        version,
        version_str,
        persona_name: artifacts.spec.identity.name.clone(),
        persona_role: artifacts.spec.identity.role.clone(),
        output_dir: output_dir.clone(),
        files,
        checksums: writer.checksums.clone(),
        confidence_score: artifacts.confidence.score,
        confidence_grade: artifacts.confidence.grade.as_str().to_string(),
        spec_valid: artifacts.validation.valid,
        total_test_scenarios: artifacts.test_suite.total_scenarios,
        build_id: Uuid::new_v4(),
    };
    writer.write_json("delivery_pack.json", &pack)?;

    info!(
        slug,
        version,
        files = writer.files.len(),
        dir = %output_dir.display(),
        "Delivery packaged"
    );

    Ok(pack)
}

fn render_summary(
    slug: &str,
    version_str: &str,
    artifacts: &BuildArtifacts<'_>,
    files: &[String],
) -> String {
    let spec = artifacts.spec;
    let prompt = artifacts.system_prompt;
    let preview: String = prompt.chars().take(500).collect();
    let ellipsis = if prompt.chars().count() > 500 { "..." } else { "" };

    let mut artifact_list: String = files
        .iter()
        .map(|f| format!("- {}\n", f))
        .collect();
    artifact_list.push_str("- delivery_summary.md\n");

    format!(
        "# Persona Delivery Summary — {name}\n\
         \n\
         **Slug:** {slug}\n\
         **Version:** {version_str}\n\
         **Role:** {role}\n\
         **Tone:** {tone}\n\
         **Date:** {date}\n\
         \n\
         ## Confidence\n\
         - Score: {score}\n\
         - Grade: {grade}\n\
         \n\
         ## Validation\n\
         - Valid: {valid}\n\
         - Errors: {errors}\n\
         - Warnings: {warnings}\n\
         \n\
         ## Test Coverage\n\
         - Scenarios: {scenarios}\n\
         - Categories: {categories}\n\
         \n\
         ## Artifacts\n\
         {artifact_list}\
         \n\
         ## Platform Configs\n\
         - OpenAI: model={openai_model}\n\
         - Claude: model={claude_model}\n\
         \n\
         ## System Prompt Preview\n\
         ```\n\
         {preview}{ellipsis}\n\
         ```\n",
        name = spec.identity.name,
        slug = slug,
        version_str = version_str,
        role = spec.identity.role,
        tone = spec.personality.tone,
        date = Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
        score = artifacts.confidence.score,
        grade = artifacts.confidence.grade,
        valid = artifacts.validation.valid,
        errors = artifacts.validation.errors.len(),
        warnings = artifacts.validation.warnings.len(),
        scenarios = artifacts.test_suite.total_scenarios,
        categories = artifacts
            .test_suite
            .categories
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", "),
        artifact_list = artifact_list,
        openai_model = artifacts.openai_config.model,
        claude_model = artifacts.claude_config.model,
        preview = preview,
        ellipsis = ellipsis,
    )
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
