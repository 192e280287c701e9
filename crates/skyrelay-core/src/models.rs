//! Model metadata — the static table mapping user-facing model names to
//! vendor API identifiers and providers.
//!
//! This is the single source of truth for which models exist. It is loaded
//! once into a `static` and never mutated; everything else (dispatch,
//! `/model`, `/models`) derives from it.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// An LLM vendor we can talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Anthropic, Provider::OpenAi, Provider::Gemini];

    /// Human-readable name for messages and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    /// Name used in `/config <provider> <key>`.
    pub fn command_name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// Parse a provider from a command argument (case-insensitive).
    pub fn parse(s: &str) -> Option<Provider> {
        match s.to_lowercase().as_str() {
            "anthropic" => Some(Provider::Anthropic),
            "openai" => Some(Provider::OpenAi),
            "gemini" => Some(Provider::Gemini),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ─────────────────────────────────────────────
// Model table
// ─────────────────────────────────────────────

/// Static metadata for one selectable model.
#[derive(Clone, Debug)]
pub struct ModelSpec {
    /// User-facing name, as typed after `/model`.
    pub name: &'static str,
    /// Identifier sent to the vendor API.
    pub api_id: &'static str,
    /// Which vendor serves this model.
    pub provider: Provider,
    /// Display category for the `/models` catalog.
    pub category: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Highlighted as recommended in the catalog.
    pub recommended: bool,
}

/// All selectable models, in catalog order.
pub static MODELS: &[ModelSpec] = &[
    ModelSpec {
        name: "claude-sonnet",
        api_id: "claude-sonnet-4-5-20250929",
        provider: Provider::Anthropic,
        category: "Claude 4.5 (Anthropic)",
        description: "Most capable",
        recommended: true,
    },
    ModelSpec {
        name: "claude-haiku",
        api_id: "claude-haiku-4-5-20251001",
        provider: Provider::Anthropic,
        category: "Claude 4.5 (Anthropic)",
        description: "Faster, cheaper",
        recommended: false,
    },
    ModelSpec {
        name: "claude-opus",
        api_id: "claude-opus-4-5-20251101",
        provider: Provider::Anthropic,
        category: "Claude 4.5 (Anthropic)",
        description: "Maximum intelligence",
        recommended: false,
    },
    ModelSpec {
        name: "gpt-5.2",
        api_id: "gpt-5.2-2025-12-11",
        provider: Provider::OpenAi,
        category: "GPT-5 (OpenAI)",
        description: "Latest release",
        recommended: false,
    },
    ModelSpec {
        name: "gpt-5-mini",
        api_id: "gpt-5-mini-2025-08-07",
        provider: Provider::OpenAi,
        category: "GPT-5 (OpenAI)",
        description: "Faster, cheaper",
        recommended: false,
    },
    ModelSpec {
        name: "gemini-3-flash",
        api_id: "gemini-3-flash-preview",
        provider: Provider::Gemini,
        category: "Gemini 3 (Google)",
        description: "Fast & free tier!",
        recommended: true,
    },
    ModelSpec {
        name: "gemini-3-pro",
        api_id: "gemini-3-pro-preview",
        provider: Provider::Gemini,
        category: "Gemini 3 (Google)",
        description: "More capable",
        recommended: false,
    },
];

/// Look up a model by its user-facing name.
pub fn find_model(name: &str) -> Option<&'static ModelSpec> {
    MODELS.iter().find(|m| m.name == name)
}

/// Whether a name is in the model table.
pub fn is_valid_model(name: &str) -> bool {
    find_model(name).is_some()
}

/// Render the model catalog as a Telegram-Markdown help text.
pub fn model_catalog() -> String {
    // Group by category, preserving table order.
    let mut categories: Vec<(&'static str, Vec<&'static ModelSpec>)> = Vec::new();
    for model in MODELS {
        match categories.iter_mut().find(|(cat, _)| *cat == model.category) {
            Some((_, entries)) => entries.push(model),
            None => categories.push((model.category, vec![model])),
        }
    }

    let mut out = String::from("Available models:\n\n");
    for (category, entries) in &categories {
        out.push_str(&format!("*{category}:*\n"));
        for model in entries {
            let rec = if model.recommended { " (recommended)" } else { "" };
            out.push_str(&format!("• `{}` - {}{}\n", model.name, model.description, rec));
        }
        out.push('\n');
    }
    out.push_str("Use `/model <name>` to switch models.");
    out
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
