//! Persona Builder - Deterministic persona build pipeline
//!
//! Turns a loosely-structured persona description into a validated,
//! versioned specification plus derived artifacts (system prompt, platform
//! configs, test scenarios). The pipeline core is a chain of pure
//! transformations:
//!
//! ```text
//! RawPersona ──normalize──▶ PersonaSpec ──validate──▶ ValidationReport
//!                                 │                          │
//!                                 └────────score◀────────────┘
//! ```
//!
//! Normalization, validation and scoring are total, deterministic
//! functions; the only shared mutable state is the per-persona version
//! counter, guarded by [`versioning::VersionAllocator`].

pub mod builder;
pub mod config;
pub mod delivery;
pub mod error;
pub mod generate;
pub mod logging;
pub mod pipeline;
pub mod spec;
pub mod version;
pub mod versioning;

pub use builder::{Assessment, BuildOutcome, BuildRejection, BuildReport, PersonaBuilder};
pub use config::BuilderConfig;
pub use error::{Error, ErrorCode, Result};
pub use pipeline::{normalize, score, validate};
pub use spec::{PersonaSpec, RawPersona};
