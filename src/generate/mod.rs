//! Artifact generators: pure string and config templating over a spec.
//!
//! Nothing here is algorithmically interesting; each generator is a
//! deterministic projection of the canonical spec into one artifact shape.

pub mod platform;
pub mod system_prompt;
pub mod test_suite;

pub use platform::{claude_config, openai_config, ChatMessage, ClaudeConfig, OpenAiConfig};
pub use system_prompt::generate_system_prompt;
pub use test_suite::{generate_test_suite, TestScenario, TestSuite};
