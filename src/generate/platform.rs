//! Platform config generators.
//!
//! Render a persona spec + system prompt into ready-to-send request
//! configurations for the OpenAI Chat Completions API and the Anthropic
//! Messages API. Sampling parameters are derived from the persona's tone
//! and response length through fixed tables.

use serde::{Deserialize, Serialize};

use crate::spec::PersonaSpec;

/// Default OpenAI model when `OPENAI_MODEL` is not set.
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Default Claude model when `CLAUDE_MODEL` is not set.
const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";

/// Tone → sampling temperature (both platforms use 0.0–1.0).
fn tone_temperature(tone: &str) -> f64 {
    match tone {
        "professional" => 0.3,
        "formal" => 0.2,
        "authoritative" => 0.2,
        "neutral" => 0.4,
        "friendly" => 0.5,
        "empathetic" => 0.5,
        "casual" => 0.7,
        "playful" => 0.8,
        _ => 0.4,
    }
}

/// Response length → max_tokens budget.
fn length_tokens(response_length: &str) -> u32 {
    match response_length {
        "concise" => 512,
        "moderate" => 1024,
        "detailed" => 2048,
        _ => 1024,
    }
}

/// Tones that warrant more creative sampling.
fn is_creative_tone(tone: &str) -> bool {
    matches!(tone, "casual" | "playful" | "friendly")
}

/// Effective token budget: length table capped by the guardrail limit.
fn effective_max_tokens(spec: &PersonaSpec) -> u32 {
    length_tokens(&spec.behavior.response_length).min(spec.guardrails.max_response_tokens)
}

// ─────────────────────────────────────────────────────────────────
// Config Types
// ─────────────────────────────────────────────────────────────────

/// One chat message in a platform config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Persona identification block embedded in both platform configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaTag {
    pub persona_name: String,
    pub persona_slug: String,
    pub persona_role: String,
    pub tone: String,
    pub response_length: String,
}

impl PersonaTag {
    fn from_spec(spec: &PersonaSpec) -> Self {
        Self {
            persona_name: spec.identity.name.clone(),
            persona_slug: spec.identity.slug.clone(),
            persona_role: spec.identity.role.clone(),
            tone: spec.personality.tone.clone(),
            response_length: spec.behavior.response_length.clone(),
        }
    }
}

/// OpenAI Chat Completions request configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub metadata: PersonaTag,
}

/// Anthropic Messages request configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaudeConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_k: u32,
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub metadata: PersonaTag,
}

// ─────────────────────────────────────────────────────────────────
// Generators
// ─────────────────────────────────────────────────────────────────

/// Generate an OpenAI Chat Completions API config.
pub fn openai_config(spec: &PersonaSpec, system_prompt: &str) -> OpenAiConfig {
    let tone = spec.personality.tone.as_str();

    OpenAiConfig {
        model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
        messages: vec![ChatMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        }],
        temperature: tone_temperature(tone),
        max_tokens: effective_max_tokens(spec),
        // Higher top_p for more creative personas
        top_p: if is_creative_tone(tone) { 0.9 } else { 0.8 },
        // Frequency penalty to reduce repetition in short answers
        frequency_penalty: if spec.behavior.response_length == "concise" {
            0.3
        } else {
            0.1
        },
        presence_penalty: 0.1,
        metadata: PersonaTag::from_spec(spec),
    }
}

/// Generate an Anthropic Claude Messages API config.
pub fn claude_config(spec: &PersonaSpec, system_prompt: &str) -> ClaudeConfig {
    let tone = spec.personality.tone.as_str();

    ClaudeConfig {
        model: std::env::var("CLAUDE_MODEL").unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.to_string()),
        max_tokens: effective_max_tokens(spec),
        temperature: tone_temperature(tone),
        // Lower top_k keeps focused personas focused
        top_k: if is_creative_tone(tone) { 40 } else { 20 },
        system: system_prompt.to_string(),
        messages: Vec::new(),
        metadata: PersonaTag::from_spec(spec),
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
