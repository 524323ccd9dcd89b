//! System prompt generator.
//!
//! Produces the platform-agnostic instruction text that defines how the
//! persona behaves. Sections are emitted only when the spec has content
//! for them, so a minimal persona gets a minimal prompt.

use crate::spec::PersonaSpec;

/// Generate a system prompt from a persona spec.
pub fn generate_system_prompt(spec: &PersonaSpec) -> String {
    let mut lines: Vec<String> = Vec::new();

    // Identity
    lines.push(format!(
        "You are {}, a {}.",
        spec.identity.name, spec.identity.role
    ));
    if !spec.identity.description.is_empty() {
        lines.push(spec.identity.description.clone());
    }
    lines.push(String::new());

    // Personality
    if !spec.personality.traits.is_empty() {
        lines.push("## Personality".to_string());
        lines.push(format!(
            "Your core traits are: {}.",
            spec.personality.traits.join(", ")
        ));
        if !spec.personality.communication_style.is_empty() {
            lines.push(format!(
                "Your communication style is {}.",
                spec.personality.communication_style
            ));
        }
        lines.push(format!(
            "Maintain a {} tone with {} formality.",
            spec.personality.tone, spec.personality.formality
        ));
        lines.push(String::new());
    }

    // Knowledge
    if !spec.knowledge.domains.is_empty() {
        lines.push("## Expertise".to_string());
        lines.push(format!(
            "You are an {}-level specialist in: {}.",
            spec.knowledge.expertise_level,
            spec.knowledge.domains.join(", ")
        ));
        if !spec.knowledge.limitations.is_empty() {
            lines.push(format!(
                "You cannot: {}.",
                spec.knowledge.limitations.join("; ")
            ));
        }
        lines.push(String::new());
    }

    // Behavior
    lines.push("## Behavior".to_string());
    lines.push(format!(
        "Keep responses {}.",
        spec.behavior.response_length
    ));
    if !spec.behavior.greeting.is_empty() {
        lines.push(format!(
            "When greeting users, say: \"{}\"",
            spec.behavior.greeting
        ));
    }
    if !spec.behavior.fallback.is_empty() {
        lines.push(format!(
            "When you don't know the answer, say: \"{}\"",
            spec.behavior.fallback
        ));
    }
    if !spec.behavior.escalation_trigger.is_empty() {
        lines.push(format!(
            "Escalate to a human when: {}.",
            spec.behavior.escalation_trigger
        ));
    }
    lines.push(String::new());

    // Guardrails
    lines.push("## Rules".to_string());
    if !spec.guardrails.forbidden_topics.is_empty() {
        lines.push(format!(
            "NEVER discuss: {}.",
            spec.guardrails.forbidden_topics.join(", ")
        ));
    }
    lines.push(format!("PII handling: {}.", spec.guardrails.pii_handling));
    lines.push(format!(
        "Keep responses under {} tokens.",
        spec.guardrails.max_response_tokens
    ));
    lines.push(
        "Always stay in character. Never reveal that you are an AI unless directly asked."
            .to_string(),
    );

    lines.join("\n")
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
