//! Crate-wide error type.
//!
//! Every failure carries a stable numeric code (`E1xx` config, `E2xx` IO,
//! `E3xx` version store, `E4xx` persona/artifact, `E9xx` internal) that
//! maps onto a CLI exit code, plus an optional remediation hint for
//! terminal display. Validation failures are NOT errors; the validator
//! reports them as data and callers branch on `valid`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Stable numeric error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Version store errors (3xx)
    StoreUnavailable = 300,
    LockTimeout = 301,
    AllocationConflict = 302,

    // Persona / artifact errors (4xx)
    PersonaNotFound = 400,
    ArtifactMalformed = 401,
    RawInputMalformed = 402,

    // Internal (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// String form, e.g. `E100`.
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// CLI exit code: one code per hundred-block.
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// All the ways a builder operation can fail
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────

    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO
    // ─────────────────────────────────────────────────────────────

    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Version Store Errors
    // ─────────────────────────────────────────────────────────────

    /// The version counter store cannot be reached or written
    #[error("Version store unavailable for '{key}': {message}")]
    StoreUnavailable { key: String, message: String },

    /// Could not acquire the per-key allocation lock in time
    #[error("Timed out acquiring version lock for '{key}' after {timeout_ms}ms")]
    LockTimeout { key: String, timeout_ms: u64 },

    /// Two allocators claimed the same version for a key
    #[error("Version conflict for '{key}': v{version} already exists")]
    AllocationConflict { key: String, version: u32 },

    // ─────────────────────────────────────────────────────────────
    // Persona / Artifact
    // ─────────────────────────────────────────────────────────────

    /// Persona has no versions on disk
    #[error("Persona not found: {slug}")]
    PersonaNotFound { slug: String },

    /// Stored artifact could not be parsed
    #[error("Malformed artifact at {path}: {message}")]
    ArtifactMalformed { path: PathBuf, message: String },

    /// Raw persona input could not be parsed
    #[error("Malformed persona input: {message}")]
    RawInput { message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Classification
    // ─────────────────────────────────────────────────────────────

    /// Numeric code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::ArtifactMalformed,

            Error::StoreUnavailable { .. } => ErrorCode::StoreUnavailable,
            Error::LockTimeout { .. } => ErrorCode::LockTimeout,
            Error::AllocationConflict { .. } => ErrorCode::AllocationConflict,

            Error::PersonaNotFound { .. } => ErrorCode::PersonaNotFound,
            Error::ArtifactMalformed { .. } => ErrorCode::ArtifactMalformed,
            Error::RawInput { .. } => ErrorCode::RawInputMalformed,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether retrying the whole operation could succeed.
    ///
    /// Lock timeouts and store hiccups are transient: the caller retries
    /// the entire allocation, never a partial read/write.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::LockTimeout { .. }
                | Error::StoreUnavailable { .. }
                | Error::AllocationConflict { .. }
                | Error::Io(_)
                | Error::IoRead { .. }
                | Error::IoWrite { .. }
        )
    }

    /// Whether the command should give up immediately
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::Internal(_)
        )
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // Presentation
    // ─────────────────────────────────────────────────────────────

    /// Remediation hint shown under the error in the terminal
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'persona-builder config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'persona-builder config show' to see the effective configuration."
            ),
            Error::ConfigValidation { .. } => Some(
                "Fix the invalid values in the configuration file; 'persona-builder config validate' re-checks it."
            ),

            Error::StoreUnavailable { .. } => Some(
                "Verify the output root exists and is writable, then retry the build."
            ),
            Error::LockTimeout { .. } => Some(
                "Another build for the same persona is in flight. Retry once it completes."
            ),
            Error::AllocationConflict { .. } => Some(
                "A concurrent writer bypassed the allocator. Retry the build; if it persists, check for external processes writing to the output tree."
            ),

            Error::PersonaNotFound { .. } => Some(
                "Run 'persona-builder list' to see which personas have versions on disk."
            ),
            Error::RawInput { .. } => Some(
                "The persona definition must be a JSON object. List fields accept either an array or a comma-separated string."
            ),

            _ => None,
        }
    }

    /// Colored rendering for the terminal, hint included
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Plain rendering for log files
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    pub fn store_unavailable(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::StoreUnavailable {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn lock_timeout(key: impl Into<String>, timeout_ms: u64) -> Self {
        Error::LockTimeout {
            key: key.into(),
            timeout_ms,
        }
    }

    pub fn persona_not_found(slug: impl Into<String>) -> Self {
        Error::PersonaNotFound { slug: slug.into() }
    }

    pub fn raw_input(message: impl Into<String>) -> Self {
        Error::RawInput {
            message: message.into(),
        }
    }

    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoRead {
            path: path.into(),
            source,
        }
    }

    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoWrite {
            path: path.into(),
            source,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
