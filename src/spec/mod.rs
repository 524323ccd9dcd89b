//! Canonical persona specification.
//!
//! A [`PersonaSpec`] is the immutable record every downstream stage consumes:
//! the normalizer produces it, the validator and scorer read it, the
//! generators render it. Raw user input enters through [`RawPersona`].

pub mod raw;
pub mod types;

pub use raw::{ListOrCsv, RawPersona};
pub use types::{
    Behavior, ExpertiseLevel, Formality, Guardrails, Identity, Knowledge, Metadata, PersonaSpec,
    Personality, ResponseLength, Tone, MAX_RESPONSE_TOKENS_LIMIT, SPEC_VERSION,
    VALID_PII_HANDLING,
};
