//! Core types for the persona specification schema.
//!
//! The closed enum sets (tone, formality, response length, expertise level)
//! are fixed at compile time. The spec record itself stores them as plain
//! strings so that specs loaded back from disk can carry out-of-set values
//! for the validator to reject; the normalizer is the only component that
//! guarantees in-set values.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────

/// Schema version stamped on every normalized spec.
pub const SPEC_VERSION: &str = "1.0.0";

/// Accepted PII handling policies.
pub const VALID_PII_HANDLING: &[&str] = &["never store", "anonymize", "encrypt"];

/// Upper bound for `guardrails.max_response_tokens`.
pub const MAX_RESPONSE_TOKENS_LIMIT: u32 = 16384;

// ─────────────────────────────────────────────────────────────────
// Closed Enum Sets
// ─────────────────────────────────────────────────────────────────

/// Voice the persona speaks with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Friendly,
    Professional,
    Casual,
    Formal,
    Empathetic,
    Authoritative,
    Playful,
    Neutral,
}

impl Tone {
    /// All valid tones.
    pub const ALL: &'static [Tone] = &[
        Tone::Friendly,
        Tone::Professional,
        Tone::Casual,
        Tone::Formal,
        Tone::Empathetic,
        Tone::Authoritative,
        Tone::Playful,
        Tone::Neutral,
    ];

    /// Canonical string form used in the spec record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Formal => "formal",
            Tone::Empathetic => "empathetic",
            Tone::Authoritative => "authoritative",
            Tone::Playful => "playful",
            Tone::Neutral => "neutral",
        }
    }

    /// Look up a tone by its canonical string.
    pub fn parse(s: &str) -> Option<Tone> {
        Tone::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Check membership in the closed set.
    pub fn is_valid(s: &str) -> bool {
        Tone::parse(s).is_some()
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Professional
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How formally the persona addresses users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formality {
    Formal,
    SemiFormal,
    Casual,
}

impl Formality {
    pub const ALL: &'static [Formality] =
        &[Formality::Formal, Formality::SemiFormal, Formality::Casual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Formality::Formal => "formal",
            Formality::SemiFormal => "semi-formal",
            Formality::Casual => "casual",
        }
    }

    pub fn parse(s: &str) -> Option<Formality> {
        Formality::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    pub fn is_valid(s: &str) -> bool {
        Formality::parse(s).is_some()
    }
}

impl Default for Formality {
    fn default() -> Self {
        Formality::SemiFormal
    }
}

impl fmt::Display for Formality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target length for persona responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseLength {
    Concise,
    Moderate,
    Detailed,
}

impl ResponseLength {
    pub const ALL: &'static [ResponseLength] = &[
        ResponseLength::Concise,
        ResponseLength::Moderate,
        ResponseLength::Detailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseLength::Concise => "concise",
            ResponseLength::Moderate => "moderate",
            ResponseLength::Detailed => "detailed",
        }
    }

    pub fn parse(s: &str) -> Option<ResponseLength> {
        ResponseLength::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    pub fn is_valid(s: &str) -> bool {
        ResponseLength::parse(s).is_some()
    }
}

impl Default for ResponseLength {
    fn default() -> Self {
        ResponseLength::Concise
    }
}

impl fmt::Display for ResponseLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Depth of domain expertise the persona claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl ExpertiseLevel {
    pub const ALL: &'static [ExpertiseLevel] = &[
        ExpertiseLevel::Beginner,
        ExpertiseLevel::Intermediate,
        ExpertiseLevel::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Beginner => "beginner",
            ExpertiseLevel::Intermediate => "intermediate",
            ExpertiseLevel::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<ExpertiseLevel> {
        ExpertiseLevel::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    pub fn is_valid(s: &str) -> bool {
        ExpertiseLevel::parse(s).is_some()
    }
}

impl Default for ExpertiseLevel {
    fn default() -> Self {
        ExpertiseLevel::Expert
    }
}

impl fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Spec
// ─────────────────────────────────────────────────────────────────

/// The canonical, immutable persona record produced by normalization.
///
/// Serialized field layout matches the on-disk `persona_spec.json` artifact;
/// the identity block is stored under the `persona` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSpec {
    /// Schema version (semver).
    pub spec_version: String,

    /// Who the persona is.
    #[serde(rename = "persona")]
    pub identity: Identity,

    /// How the persona speaks.
    pub personality: Personality,

    /// What the persona knows.
    pub knowledge: Knowledge,

    /// How the persona acts in conversation.
    pub behavior: Behavior,

    /// Safety constraints.
    pub guardrails: Guardrails,

    /// Provenance.
    pub metadata: Metadata,
}

/// Identity block: name, derived slug, role, description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,

    /// Kebab-case slug derived deterministically from `name`.
    pub slug: String,

    pub role: String,

    pub description: String,
}

/// Personality block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Ordered list of character traits; may be empty.
    #[serde(default)]
    pub traits: Vec<String>,

    pub communication_style: String,

    pub tone: String,

    pub formality: String,
}

/// Knowledge block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knowledge {
    #[serde(default)]
    pub domains: Vec<String>,

    pub expertise_level: String,

    #[serde(default)]
    pub limitations: Vec<String>,
}

/// Behavior block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Behavior {
    pub greeting: String,

    pub fallback: String,

    pub escalation_trigger: String,

    pub response_length: String,
}

/// Guardrails block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardrails {
    #[serde(default)]
    pub forbidden_topics: Vec<String>,

    pub pii_handling: String,

    pub max_response_tokens: u32,
}

/// Metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub author: String,

    #[serde(default)]
    pub notes: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
