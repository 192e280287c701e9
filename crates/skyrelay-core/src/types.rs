//! Canonical chat types shared by the dispatcher, the adapters, and storage.
//!
//! A conversation is a flat list of user/assistant turns. History is bounded:
//! the only way to grow it is [`ConversationHistory::push_exchange`], which
//! appends a user/assistant pair and trims the oldest entries past the cap.
//! Because every append is a pair, front-trimming never splits a turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Provider;

/// Maximum number of messages retained per user (10 exchanges).
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// Model selected for users who never ran `/model`.
pub const DEFAULT_MODEL: &str = "gemini-3-flash";

// ─────────────────────────────────────────────
// Chat messages
// ─────────────────────────────────────────────

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Conversation history
// ─────────────────────────────────────────────

/// Bounded, ordered log of prior turns for one user.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationHistory {
    pub messages: Vec<ChatMessage>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        ConversationHistory {
            messages: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

impl ConversationHistory {
    /// Append one user/assistant exchange, then trim to the cap.
    ///
    /// This is the only append operation — entries always arrive in pairs,
    /// so trimming an even excess from the front keeps pairs intact.
    pub fn push_exchange(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.messages.push(ChatMessage::user(user_text));
        self.messages.push(ChatMessage::assistant(assistant_text));

        if self.messages.len() > MAX_HISTORY_MESSAGES {
            let excess = self.messages.len() - MAX_HISTORY_MESSAGES;
            self.messages.drain(..excess);
        }

        self.updated_at = Utc::now();
    }
}

// ─────────────────────────────────────────────
// Per-user configuration
// ─────────────────────────────────────────────

/// Per-user settings stored in the key-value store.
///
/// A lookup miss yields `UserConfig::default()` — there is no explicit
/// creation step. Serialized with camelCase keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    /// User-facing model name (a key into the static model table).
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_key: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            model: DEFAULT_MODEL.to_string(),
            anthropic_key: None,
            openai_key: None,
            gemini_key: None,
        }
    }
}

impl UserConfig {
    /// The stored credential for a provider, if any.
    pub fn key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Anthropic => self.anthropic_key.as_deref(),
            Provider::OpenAi => self.openai_key.as_deref(),
            Provider::Gemini => self.gemini_key.as_deref(),
        }
    }

    /// Whether a non-empty credential is stored for a provider.
    pub fn has_key(&self, provider: Provider) -> bool {
        self.key_for(provider).is_some_and(|k| !k.is_empty())
    }

    /// Merge a partial update: present fields overwrite, absent fields keep
    /// their current value.
    pub fn apply(&mut self, patch: UserConfigPatch) {
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(key) = patch.anthropic_key {
            self.anthropic_key = Some(key);
        }
        if let Some(key) = patch.openai_key {
            self.openai_key = Some(key);
        }
        if let Some(key) = patch.gemini_key {
            self.gemini_key = Some(key);
        }
    }
}

/// Partial update for [`UserConfig`] — only present fields are written.
#[derive(Clone, Debug, Default)]
pub struct UserConfigPatch {
    pub model: Option<String>,
    pub anthropic_key: Option<String>,
    pub openai_key: Option<String>,
    pub gemini_key: Option<String>,
}

impl UserConfigPatch {
    /// Patch that switches the selected model.
    pub fn model(name: impl Into<String>) -> Self {
        UserConfigPatch {
            model: Some(name.into()),
            ..Default::default()
        }
    }

    /// Patch that sets one provider's credential.
    pub fn credential(provider: Provider, key: impl Into<String>) -> Self {
        let key = Some(key.into());
        match provider {
            Provider::Anthropic => UserConfigPatch {
                anthropic_key: key,
                ..Default::default()
            },
            Provider::OpenAi => UserConfigPatch {
                openai_key: key,
                ..Default::default()
            },
            Provider::Gemini => UserConfigPatch {
                gemini_key: key,
                ..Default::default()
            },
        }
    }
}

/// Mask an API key for display: `sk-a...wxyz`, or `****` for short keys.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
