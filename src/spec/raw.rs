//! Loosely-typed persona input.
//!
//! [`RawPersona`] is the shape user-supplied persona definitions arrive in.
//! Every field is optional; the normalizer fills in defaults. List-valued
//! fields accept either a native JSON array or a comma-separated string.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A field that may arrive as a list or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListOrCsv {
    List(Vec<String>),
    Csv(String),
}

impl ListOrCsv {
    /// Resolve to a list: CSV input is split on commas, items trimmed,
    /// empty tokens dropped, order preserved. Native lists pass through.
    pub fn into_items(self) -> Vec<String> {
        match self {
            ListOrCsv::List(items) => items,
            ListOrCsv::Csv(text) => text
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// Raw persona definition, as submitted by a user or upstream agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPersona {
    pub name: Option<String>,

    pub role: Option<String>,

    pub description: Option<String>,

    pub traits: Option<ListOrCsv>,

    pub communication_style: Option<String>,

    pub tone: Option<String>,

    pub formality: Option<String>,

    /// Accepted under both `knowledge_domains` and `domains`.
    #[serde(alias = "domains")]
    pub knowledge_domains: Option<ListOrCsv>,

    pub expertise_level: Option<String>,

    pub limitations: Option<ListOrCsv>,

    pub greeting: Option<String>,

    pub fallback: Option<String>,

    pub escalation_trigger: Option<String>,

    pub response_length: Option<String>,

    pub forbidden_topics: Option<ListOrCsv>,

    pub pii_handling: Option<String>,

    pub max_response_tokens: Option<u32>,

    pub author: Option<String>,

    pub notes: Option<ListOrCsv>,
}

impl RawPersona {
    /// Parse a raw persona definition from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::raw_input(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
