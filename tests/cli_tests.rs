//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the persona-builder binary
fn builder_cmd() -> Command {
    Command::cargo_bin("persona-builder").unwrap()
}

/// Write a valid persona definition into `dir` and return its path
fn write_persona(dir: &Path) -> String {
    let persona = serde_json::json!({
        "name": "Rebecka",
        "role": "Customer Success Manager",
        "description": "Warm CSM for onboarding.",
        "traits": ["empathetic", "professional"],
        "communication_style": "warm and direct",
        "tone": "friendly",
        "knowledge_domains": ["onboarding", "SaaS"],
        "greeting": "Hi! I'm Rebecka.",
        "fallback": "Let me check on that.",
        "escalation_trigger": "Speak to human",
        "forbidden_topics": ["competitor pricing"],
        "pii_handling": "never store",
        "max_response_tokens": 800,
        "author": "brian"
    });
    let path = dir.join("rebecka.json");
    fs::write(&path, serde_json::to_string_pretty(&persona).unwrap()).unwrap();
    path.display().to_string()
}

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    builder_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Persona Builder"))
        .stdout(predicate::str::contains("assess"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("versions"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_command() {
    builder_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("persona-builder"))
        .stdout(predicate::str::contains("Build Information"))
        .stdout(predicate::str::contains("Git Hash"));
}

#[test]
fn test_short_version_flag() {
    builder_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("persona-builder"));
}

// ─────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_default() {
    builder_cmd()
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("[storage]"))
        .stdout(predicate::str::contains("output_root"))
        .stdout(predicate::str::contains("[allocation]"));
}

#[test]
fn test_config_init_and_validate() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("config.toml");

    builder_cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(config_path.display().to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    assert!(config_path.is_file());

    builder_cmd()
        .arg("--config")
        .arg(config_path.display().to_string())
        .arg("config")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("config.toml");
    fs::write(&config_path, "# existing\n").unwrap();

    builder_cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(config_path.display().to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ─────────────────────────────────────────────────────────────────
// Pipeline Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_assess_command() {
    let tmp = TempDir::new().unwrap();
    let persona = write_persona(tmp.path());

    builder_cmd()
        .arg("--quiet")
        .arg("assess")
        .arg(&persona)
        .env("PERSONA_OUTPUT_ROOT", tmp.path().join("output"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"persona_slug\": \"rebecka\""))
        .stdout(predicate::str::contains("\"spec_valid\": true"));
}

#[test]
fn test_build_command_creates_versions() {
    let tmp = TempDir::new().unwrap();
    let persona = write_persona(tmp.path());
    let output_root = tmp.path().join("output");

    builder_cmd()
        .arg("--quiet")
        .arg("build")
        .arg(&persona)
        .env("PERSONA_OUTPUT_ROOT", &output_root)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": 1"));

    assert!(output_root
        .join("rebecka")
        .join("v1")
        .join("persona_spec.json")
        .is_file());
    assert!(output_root
        .join("rebecka")
        .join("v1")
        .join("system_prompt.txt")
        .is_file());

    // Rebuilding the same persona allocates the next version
    builder_cmd()
        .arg("--quiet")
        .arg("build")
        .arg(&persona)
        .env("PERSONA_OUTPUT_ROOT", &output_root)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": 2"));
}

#[test]
fn test_build_rejects_invalid_persona() {
    let tmp = TempDir::new().unwrap();
    let persona_path = tmp.path().join("bad.json");
    fs::write(
        &persona_path,
        r#"{"name": "Rebecka", "pii_handling": "keep everything"}"#,
    )
    .unwrap();

    builder_cmd()
        .arg("--quiet")
        .arg("build")
        .arg(persona_path.display().to_string())
        .env("PERSONA_OUTPUT_ROOT", tmp.path().join("output"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Validation failed"))
        .stdout(predicate::str::contains("GR-002"));
}

#[test]
fn test_test_suite_command() {
    let tmp = TempDir::new().unwrap();
    let persona = write_persona(tmp.path());

    builder_cmd()
        .arg("--quiet")
        .arg("test-suite")
        .arg(&persona)
        .env("PERSONA_OUTPUT_ROOT", tmp.path().join("output"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_scenarios\": 8"))
        .stdout(predicate::str::contains("TC-001"));
}

#[test]
fn test_list_and_versions_commands() {
    let tmp = TempDir::new().unwrap();
    let persona = write_persona(tmp.path());
    let output_root = tmp.path().join("output");

    builder_cmd()
        .arg("--quiet")
        .arg("build")
        .arg(&persona)
        .env("PERSONA_OUTPUT_ROOT", &output_root)
        .assert()
        .success();

    builder_cmd()
        .arg("--quiet")
        .arg("list")
        .env("PERSONA_OUTPUT_ROOT", &output_root)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slug\": \"rebecka\""))
        .stdout(predicate::str::contains("\"total_versions\": 1"));

    builder_cmd()
        .arg("--quiet")
        .arg("versions")
        .arg("rebecka")
        .env("PERSONA_OUTPUT_ROOT", &output_root)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"latest_version\": 1"))
        .stdout(predicate::str::contains("\"next_version\": 2"));
}

// ─────────────────────────────────────────────────────────────────
// Error Paths
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_missing_persona_file() {
    let tmp = TempDir::new().unwrap();

    builder_cmd()
        .arg("--quiet")
        .arg("assess")
        .arg(tmp.path().join("nope.json").display().to_string())
        .env("PERSONA_OUTPUT_ROOT", tmp.path().join("output"))
        .assert()
        .failure()
        .code(20)
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_versions_unknown_slug() {
    let tmp = TempDir::new().unwrap();

    builder_cmd()
        .arg("--quiet")
        .arg("versions")
        .arg("ghost")
        .env("PERSONA_OUTPUT_ROOT", tmp.path().join("output"))
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("Persona not found: ghost"));
}

#[test]
fn test_malformed_persona_json() {
    let tmp = TempDir::new().unwrap();
    let persona_path = tmp.path().join("broken.json");
    fs::write(&persona_path, "{not json").unwrap();

    builder_cmd()
        .arg("--quiet")
        .arg("assess")
        .arg(persona_path.display().to_string())
        .env("PERSONA_OUTPUT_ROOT", tmp.path().join("output"))
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("Malformed persona input"));
}
