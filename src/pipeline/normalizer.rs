//! Persona normalizer: raw loosely-typed input to canonical spec.
//!
//! Normalization never fails: every field has a default, invalid enum values
//! fall back silently, and list fields coerce from comma-separated strings.
//! Enum correctness is enforced later, by the validator, as a hard error.
//! The two layers are intentionally asymmetric (tolerant shaping here,
//! strict gating there).

use chrono::{DateTime, SubsecRound, Utc};

use crate::spec::types::{
    Behavior, ExpertiseLevel, Formality, Guardrails, Identity, Knowledge, Metadata, PersonaSpec,
    Personality, ResponseLength, Tone, SPEC_VERSION,
};
use crate::spec::RawPersona;

// ─────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────

const DEFAULT_NAME: &str = "Unnamed";
const DEFAULT_ROLE: &str = "AI Assistant";
const DEFAULT_COMMUNICATION_STYLE: &str = "clear and helpful";
const DEFAULT_FALLBACK: &str =
    "I'm not sure about that. Let me connect you with someone who can help.";
const DEFAULT_ESCALATION_TRIGGER: &str = "Request to speak with a human";
const DEFAULT_PII_HANDLING: &str = "never store";
const DEFAULT_AUTHOR: &str = "system";
const DEFAULT_MAX_RESPONSE_TOKENS: u32 = 1024;

// ─────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────

/// Normalize a raw persona definition into a canonical [`PersonaSpec`].
///
/// `now` pins the created/updated timestamps for deterministic output;
/// when `None`, the current UTC time is used. Both timestamps are always
/// identical on a freshly normalized spec.
pub fn normalize(raw: &RawPersona, now: Option<DateTime<Utc>>) -> PersonaSpec {
    let name = raw
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_NAME.to_string());
    let slug = slugify(&name);

    // Second precision keeps the serialized form stable across runs
    let ts = now.unwrap_or_else(Utc::now).trunc_subsecs(0);

    let traits = list_field(raw.traits.clone());
    let domains = list_field(raw.knowledge_domains.clone());
    let limitations = list_field(raw.limitations.clone());
    let forbidden_topics = list_field(raw.forbidden_topics.clone());
    let notes = list_field(raw.notes.clone());

    PersonaSpec {
        spec_version: SPEC_VERSION.to_string(),
        identity: Identity {
            role: raw
                .role
                .clone()
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            description: raw
                .description
                .clone()
                .unwrap_or_else(|| format!("{} is an AI assistant.", name)),
            slug,
            name,
        },
        personality: Personality {
            traits,
            communication_style: raw
                .communication_style
                .clone()
                .unwrap_or_else(|| DEFAULT_COMMUNICATION_STYLE.to_string()),
            tone: enum_or_default(raw.tone.as_deref(), Tone::is_valid, Tone::default().as_str()),
            formality: enum_or_default(
                raw.formality.as_deref(),
                Formality::is_valid,
                Formality::default().as_str(),
            ),
        },
        knowledge: Knowledge {
            domains,
            expertise_level: enum_or_default(
                raw.expertise_level.as_deref(),
                ExpertiseLevel::is_valid,
                ExpertiseLevel::default().as_str(),
            ),
            limitations,
        },
        behavior: Behavior {
            greeting: raw.greeting.clone().unwrap_or_else(|| {
                format!(
                    "Hi! I'm {}. How can I help you today?",
                    spec_name(&raw.name)
                )
            }),
            fallback: raw
                .fallback
                .clone()
                .unwrap_or_else(|| DEFAULT_FALLBACK.to_string()),
            escalation_trigger: raw
                .escalation_trigger
                .clone()
                .unwrap_or_else(|| DEFAULT_ESCALATION_TRIGGER.to_string()),
            response_length: enum_or_default(
                raw.response_length.as_deref(),
                ResponseLength::is_valid,
                ResponseLength::default().as_str(),
            ),
        },
        guardrails: Guardrails {
            forbidden_topics,
            pii_handling: raw
                .pii_handling
                .clone()
                .unwrap_or_else(|| DEFAULT_PII_HANDLING.to_string()),
            max_response_tokens: raw
                .max_response_tokens
                .unwrap_or(DEFAULT_MAX_RESPONSE_TOKENS),
        },
        metadata: Metadata {
            created_at: ts,
            updated_at: ts,
            author: raw
                .author
                .clone()
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            notes,
        },
    }
}

/// Convert a persona name to a kebab-case slug.
///
/// Lowercase, strip characters outside `[a-z0-9\s-]`, collapse whitespace
/// runs to single hyphens, collapse hyphen runs, trim leading/trailing
/// hyphens. An empty result becomes `"unnamed"`.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for ch in lowered.chars() {
        let mapped = match ch {
            'a'..='z' | '0'..='9' => Some(ch),
            c if c.is_whitespace() => None,
            '-' => None,
            _ => continue,
        };
        match mapped {
            Some(c) => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            }
            // Whitespace and literal hyphens both separate words
            None => pending_hyphen = true,
        }
    }

    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug
    }
}

fn list_field(field: Option<crate::spec::ListOrCsv>) -> Vec<String> {
    field.map(|f| f.into_items()).unwrap_or_default()
}

fn enum_or_default(value: Option<&str>, is_valid: fn(&str) -> bool, default: &str) -> String {
    match value {
        Some(v) if is_valid(v) => v.to_string(),
        _ => default.to_string(),
    }
}

fn spec_name(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or(DEFAULT_NAME)
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ListOrCsv;
    use chrono::TimeZone;

    fn fixed_ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap()
    }

    fn full_raw() -> RawPersona {
        RawPersona {
            name: Some("Rebecka".into()),
            role: Some("Customer Success Manager".into()),
            description: Some("Warm and empathetic CSM who helps with onboarding.".into()),
            traits: Some(ListOrCsv::List(vec![
                "empathetic".into(),
                "professional".into(),
                "patient".into(),
            ])),
            communication_style: Some("warm and direct".into()),
            tone: Some("friendly".into()),
            formality: Some("semi-formal".into()),
            knowledge_domains: Some(ListOrCsv::List(vec![
                "customer onboarding".into(),
                "SaaS products".into(),
                "account management".into(),
            ])),
            expertise_level: Some("expert".into()),
            limitations: Some(ListOrCsv::List(vec!["cannot access billing systems".into()])),
            greeting: Some("Hi! I'm Rebecka, your Customer Success Manager.".into()),
            fallback: Some("Great question — let me check with my team and get back to you.".into()),
            response_length: Some("concise".into()),
            forbidden_topics: Some(ListOrCsv::List(vec![
                "competitor pricing".into(),
                "internal roadmap".into(),
            ])),
            max_response_tokens: Some(800),
            author: Some("brian".into()),
            notes: Some(ListOrCsv::List(vec![
                "Primary persona for onboarding flows".into(),
            ])),
            ..RawPersona::default()
        }
    }

    #[test]
    fn test_full_persona_normalization() {
        let spec = normalize(&full_raw(), Some(fixed_ts()));

        assert_eq!(spec.spec_version, "1.0.0");
        assert_eq!(spec.identity.name, "Rebecka");
        assert_eq!(spec.identity.slug, "rebecka");
        assert_eq!(spec.identity.role, "Customer Success Manager");
        assert_eq!(spec.personality.tone, "friendly");
        assert_eq!(spec.personality.formality, "semi-formal");
        assert_eq!(spec.personality.traits.len(), 3);
        assert_eq!(spec.knowledge.domains.len(), 3);
        assert_eq!(spec.knowledge.expertise_level, "expert");
        assert_eq!(spec.behavior.response_length, "concise");
        assert_eq!(spec.guardrails.max_response_tokens, 800);
        assert_eq!(spec.guardrails.forbidden_topics.len(), 2);
        assert_eq!(spec.metadata.created_at, fixed_ts());
        assert_eq!(spec.metadata.author, "brian");
    }

    #[test]
    fn test_minimal_persona_defaults() {
        let raw = RawPersona {
            name: Some("Daniel".into()),
            ..RawPersona::default()
        };
        let spec = normalize(&raw, Some(fixed_ts()));

        assert_eq!(spec.identity.name, "Daniel");
        assert_eq!(spec.identity.slug, "daniel");
        assert_eq!(spec.identity.role, "AI Assistant");
        assert_eq!(spec.identity.description, "Daniel is an AI assistant.");
        assert_eq!(spec.personality.tone, "professional");
        assert!(spec.behavior.greeting.starts_with("Hi! I'm Daniel"));
        assert_eq!(spec.guardrails.max_response_tokens, 1024);
        assert_eq!(spec.guardrails.pii_handling, "never store");
        assert_eq!(spec.metadata.author, "system");
        assert_eq!(spec.metadata.created_at, spec.metadata.updated_at);
    }

    #[test]
    fn test_interpolated_defaults_differ_per_name() {
        let a = normalize(
            &RawPersona {
                name: Some("Sarah".into()),
                ..RawPersona::default()
            },
            Some(fixed_ts()),
        );
        let b = normalize(
            &RawPersona {
                name: Some("Andrew".into()),
                ..RawPersona::default()
            },
            Some(fixed_ts()),
        );
        assert_ne!(a.behavior.greeting, b.behavior.greeting);
        assert_ne!(a.identity.description, b.identity.description);
    }

    #[test]
    fn test_string_inputs_converted_to_lists() {
        let raw = RawPersona {
            name: Some("Sarah".into()),
            traits: Some(ListOrCsv::Csv("energetic, persuasive, confident".into())),
            knowledge_domains: Some(ListOrCsv::Csv("sales, lead qualification".into())),
            forbidden_topics: Some(ListOrCsv::Csv("competitor pricing".into())),
            ..RawPersona::default()
        };
        let spec = normalize(&raw, Some(fixed_ts()));

        assert_eq!(
            spec.personality.traits,
            vec!["energetic", "persuasive", "confident"]
        );
        assert_eq!(spec.knowledge.domains, vec!["sales", "lead qualification"]);
        assert_eq!(spec.guardrails.forbidden_topics, vec!["competitor pricing"]);
    }

    #[test]
    fn test_invalid_enums_fall_back_to_defaults() {
        let raw = RawPersona {
            name: Some("Andrew".into()),
            tone: Some("INVALID".into()),
            formality: Some("INVALID".into()),
            response_length: Some("INVALID".into()),
            expertise_level: Some("INVALID".into()),
            max_response_tokens: Some(800),
            ..RawPersona::default()
        };
        let spec = normalize(&raw, Some(fixed_ts()));

        assert_eq!(spec.personality.tone, "professional");
        assert_eq!(spec.personality.formality, "semi-formal");
        assert_eq!(spec.behavior.response_length, "concise");
        assert_eq!(spec.knowledge.expertise_level, "expert");
        // Enum invalidity never pollutes unrelated fields
        assert_eq!(spec.guardrails.max_response_tokens, 800);
    }

    #[test]
    fn test_slug_generation() {
        assert_eq!(slugify("Rebecka"), "rebecka");
        assert_eq!(slugify("Sarah Jane"), "sarah-jane");
        assert_eq!(slugify("  Andrew  "), "andrew");
        assert_eq!(slugify("Mr. Daniel O'Brien"), "mr-daniel-obrien");
        assert_eq!(slugify(""), "unnamed");
        assert_eq!(slugify("---"), "unnamed");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn test_determinism() {
        let raw = full_raw();
        let a = normalize(&raw, Some(fixed_ts()));
        let b = normalize(&raw, Some(fixed_ts()));
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_missing_name_falls_back() {
        let spec = normalize(&RawPersona::default(), Some(fixed_ts()));
        assert_eq!(spec.identity.name, "Unnamed");
        assert_eq!(spec.identity.slug, "unnamed");
    }
}
