//! The pure transformation pipeline: normalize → validate → score.
//!
//! Every stage is a deterministic, total function of its inputs. Nothing in
//! this module touches the filesystem, the clock (beyond the injectable
//! timestamp), or shared state.

pub mod normalizer;
pub mod scorer;
pub mod validator;

pub use normalizer::{normalize, slugify};
pub use scorer::{score, ConfidenceReport, Flag, FlagSeverity, Grade};
pub use validator::{validate, RuleFinding, Severity, ValidationReport};
