//! Dispatch — route one chat request to the adapter for the user's model.
//!
//! Resolution happens in two steps before any network traffic: the model
//! name is looked up in the static table, then the provider's credential is
//! checked on the user config. A missing credential short-circuits to a
//! helpful error without burning a round trip on a guaranteed auth failure.

use tracing::debug;

use skyrelay_core::models::{find_model, Provider};
use skyrelay_core::types::{ChatMessage, UserConfig};

use crate::anthropic::AnthropicClient;
use crate::error::DispatchError;
use crate::gemini::GeminiClient;
use crate::openai::OpenAiClient;

/// Owns one adapter per vendor and routes requests by provider tag.
pub struct Dispatcher {
    anthropic: AnthropicClient,
    openai: OpenAiClient,
    gemini: GeminiClient,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            anthropic: AnthropicClient::new(),
            openai: OpenAiClient::new(),
            gemini: GeminiClient::new(),
        }
    }

    /// Build from pre-configured adapters (tests point these at mock servers).
    pub fn with_clients(
        anthropic: AnthropicClient,
        openai: OpenAiClient,
        gemini: GeminiClient,
    ) -> Self {
        Dispatcher {
            anthropic,
            openai,
            gemini,
        }
    }

    /// Run one chat turn against the user's selected model.
    ///
    /// Every failure mode is a [`DispatchError`] whose `Display` is the
    /// user-facing message — callers render `Ok(text)` or `err.to_string()`
    /// and nothing else.
    pub async fn dispatch(
        &self,
        config: &UserConfig,
        messages: &[ChatMessage],
    ) -> Result<String, DispatchError> {
        let spec = find_model(&config.model)
            .ok_or_else(|| DispatchError::UnknownModel(config.model.clone()))?;

        let Some(api_key) = config.key_for(spec.provider).filter(|k| !k.is_empty()) else {
            return Err(DispatchError::MissingCredential {
                provider: spec.provider,
                model: config.model.clone(),
            });
        };

        debug!(model = %config.model, provider = %spec.provider, "dispatching chat");

        let text = match spec.provider {
            Provider::Anthropic => self.anthropic.chat(api_key, messages, spec.api_id).await?,
            Provider::OpenAi => self.openai.chat(api_key, messages, spec.api_id).await?,
            Provider::Gemini => self.gemini.chat(api_key, messages, spec.api_id).await?,
        };

        Ok(text)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
