//! Configuration loading tests
//!
//! Drives config parsing, validation and environment overrides through
//! the binary, the way operators actually hit them.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test fixture holding a throwaway config file
struct ConfigFixture {
    #[allow(dead_code)]
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl ConfigFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        Self {
            temp_dir,
            config_path,
        }
    }

    fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).unwrap();
    }

    fn path(&self) -> &str {
        self.config_path.to_str().unwrap()
    }
}

fn validate_cmd(fixture: &ConfigFixture) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("persona-builder").unwrap();
    cmd.arg("--config")
        .arg(fixture.path())
        .arg("config")
        .arg("validate");
    cmd
}

// ─────────────────────────────────────────────────────────────────
// Valid Configurations
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_minimal_config() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[storage]
output_root = "/tmp/personas"
"#,
    );

    validate_cmd(&fixture).assert().success();
}

#[test]
fn test_full_config() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[builder]
min_confidence = 0.5
default_author = "platform-team"

[storage]
output_root = "/tmp/personas"

[allocation]
lock_timeout_ms = 250

[logging]
level = "debug"
file = "/tmp/persona-builder/builder.log"
max_file_size_mb = 50
max_files = 3
json_format = true
"#,
    );

    validate_cmd(&fixture).assert().success();
}

// ─────────────────────────────────────────────────────────────────
// Invalid Configurations
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_confidence_out_of_range() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[builder]
min_confidence = 1.5
"#,
    );

    validate_cmd(&fixture).assert().failure();
}

#[test]
fn test_zero_lock_timeout() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[allocation]
lock_timeout_ms = 0
"#,
    );

    validate_cmd(&fixture).assert().failure();
}

#[test]
fn test_invalid_log_level() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[logging]
level = "shouting"
"#,
    );

    validate_cmd(&fixture).assert().failure();
}

#[test]
fn test_malformed_toml() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[storage
output_root = "/tmp/personas"
"#,
    );

    validate_cmd(&fixture).assert().failure();
}

#[test]
fn test_missing_explicit_config_fails() {
    let fixture = ConfigFixture::new();
    // No file written; an explicit --config path must exist

    validate_cmd(&fixture).assert().failure();
}

// ─────────────────────────────────────────────────────────────────
// Overrides
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_reflects_file_values() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[builder]
min_confidence = 0.75

[allocation]
lock_timeout_ms = 1234
"#,
    );

    assert_cmd::Command::cargo_bin("persona-builder")
        .unwrap()
        .arg("--config")
        .arg(fixture.path())
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicates::str::contains("min_confidence = 0.75"))
        .stdout(predicates::str::contains("lock_timeout_ms = 1234"));
}

#[test]
fn test_env_override_beats_file() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[allocation]
lock_timeout_ms = 1234
"#,
    );

    assert_cmd::Command::cargo_bin("persona-builder")
        .unwrap()
        .arg("--config")
        .arg(fixture.path())
        .arg("config")
        .arg("show")
        .env("PERSONA_LOCK_TIMEOUT_MS", "9999")
        .assert()
        .success()
        .stdout(predicates::str::contains("lock_timeout_ms = 9999"));
}

#[test]
fn test_env_output_root_override() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[storage]
output_root = "/tmp/from-file"
"#,
    );

    assert_cmd::Command::cargo_bin("persona-builder")
        .unwrap()
        .arg("--config")
        .arg(fixture.path())
        .arg("config")
        .arg("show")
        .env("PERSONA_OUTPUT_ROOT", "/tmp/from-env")
        .assert()
        .success()
        .stdout(predicates::str::contains("/tmp/from-env"));
}
