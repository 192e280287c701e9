//! Anthropic adapter — the Messages API.
//!
//! The system instruction goes in the dedicated `system` field; the response
//! is a list of content blocks from which the text blocks are joined.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use skyrelay_core::models::Provider;
use skyrelay_core::types::{ChatMessage, Role};

use crate::error::{status_error, ProviderError};
use crate::prompt::SYSTEM_PROMPT;

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// HTTP client for the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_base: String,
}

impl AnthropicClient {
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Point the client at a different base URL (tests use a mock server).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");

        AnthropicClient {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base)
    }

    /// Send one chat request. Exactly one outbound HTTP call, no retries.
    pub async fn chat(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        model_id: &str,
    ) -> Result<String, ProviderError> {
        let request = MessagesRequest {
            model: model_id,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: messages.iter().map(WireMessage::from).collect(),
        };

        debug!(model = %model_id, messages = messages.len(), "calling Anthropic");

        let response = self
            .http
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::http(Provider::Anthropic, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Anthropic API error");
            return Err(status_error(Provider::Anthropic, status.as_u16(), &body));
        }

        let data: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::http(Provider::Anthropic, e))?;

        let texts: Vec<&str> = data
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        if texts.is_empty() {
            return Err(ProviderError::EmptyResponse(Provider::Anthropic));
        }

        Ok(texts.join("\n"))
    }
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        WireMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: &msg.content,
        }
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
