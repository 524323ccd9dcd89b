//! Builder configuration.
//!
//! Settings come from a TOML file overlaid with `PERSONA_*` environment
//! variables; CLI arguments beat both. Anything unspecified falls back to
//! a compiled-in default, so the builder runs with no config file at all.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Main builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Build pipeline settings
    pub builder: BuilderSettings,

    /// Output tree settings
    pub storage: StorageSettings,

    /// Version allocation settings
    pub allocation: AllocationSettings,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Build pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderSettings {
    /// Reject builds scoring below this confidence (0.0 = accept all)
    pub min_confidence: f64,

    /// Author recorded on specs that don't name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_author: Option<String>,
}

/// Output tree settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Root directory for packaged persona versions
    pub output_root: String,
}

/// Version allocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationSettings {
    /// Maximum wait for a contended persona's version lock, in milliseconds
    pub lock_timeout_ms: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of trace, debug, info, warn, error
    pub level: String,

    /// Log file path; absent means console-only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Rotate the log file once it grows past this many MB
    pub max_file_size_mb: u64,

    /// How many rotated files to keep around
    pub max_files: u32,

    /// Emit structured JSON instead of human-readable lines
    pub json_format: bool,
}

// Default implementations

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            builder: BuilderSettings::default(),
            storage: StorageSettings::default(),
            allocation: AllocationSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            default_author: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            output_root: "~/.persona-builder/output".to_string(),
        }
    }
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl BuilderConfig {
    /// Load configuration: file, then env overrides, then path expansion
    /// and validation.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
            config = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Locate the configuration file.
    ///
    /// An explicit path must exist; otherwise the standard locations are
    /// searched in order and missing everywhere just means defaults.
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let expanded = shellexpand::tilde(path);
            let path = PathBuf::from(expanded.as_ref());
            if path.exists() {
                return Ok(Some(path));
            } else {
                return Err(Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        // cwd, then per-user locations, then system-wide
        let search_paths = [
            PathBuf::from("persona-builder.toml"),
            dirs::config_dir()
                .map(|p| p.join("persona-builder").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".persona-builder").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/persona-builder/config.toml"),
        ];

        for path in &search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Overlay `PERSONA_*` environment variables onto the loaded values.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PERSONA_MIN_CONFIDENCE") {
            if let Ok(n) = val.parse() {
                self.builder.min_confidence = n;
            }
        }
        if let Ok(val) = std::env::var("PERSONA_DEFAULT_AUTHOR") {
            self.builder.default_author = Some(val);
        }

        if let Ok(val) = std::env::var("PERSONA_OUTPUT_ROOT") {
            self.storage.output_root = val;
        }

        if let Ok(val) = std::env::var("PERSONA_LOCK_TIMEOUT_MS") {
            if let Ok(n) = val.parse() {
                self.allocation.lock_timeout_ms = n;
            }
        }

        if let Ok(val) = std::env::var("PERSONA_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("PERSONA_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand `~` and embedded env vars in configured paths.
    fn expand_paths(&mut self) {
        self.storage.output_root = expand_path(&self.storage.output_root);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Reject configurations the builder cannot run with.
    fn validate(&self) -> Result<()> {
        if self.storage.output_root.is_empty() {
            return Err(Error::Config("Output root cannot be empty".to_string()));
        }

        if !(0.0..=1.0).contains(&self.builder.min_confidence) {
            return Err(Error::Config(
                "min_confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.allocation.lock_timeout_ms == 0 {
            return Err(Error::Config(
                "lock_timeout_ms must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Get the output root as a PathBuf
    pub fn output_root(&self) -> PathBuf {
        PathBuf::from(&self.storage.output_root)
    }

    /// Get the version lock timeout as a Duration
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.allocation.lock_timeout_ms)
    }
}

fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Write a commented default config file for `config init`.
pub fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".persona-builder")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
    }

    fs::write(&config_path, generate_default_config())
        .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

    println!("Configuration file created: {}", config_path.display());
    Ok(())
}

fn generate_default_config() -> String {
    r#"# Persona Builder Configuration

[builder]
# Reject builds scoring below this confidence (0.0 accepts everything)
min_confidence = 0.0

# Author recorded on specs that don't name one
# default_author = "platform-team"

[storage]
# Root directory for packaged persona versions
output_root = "~/.persona-builder/output"

[allocation]
# Maximum wait for a contended persona's version lock, in milliseconds
lock_timeout_ms = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out for console-only logging)
# file = "~/.persona-builder/logs/builder.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
