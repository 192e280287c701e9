//! OpenAI adapter — the Chat Completions API.
//!
//! OpenAI has no dedicated system field, so the system instruction is
//! prepended as a synthetic leading system-role message.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use skyrelay_core::models::Provider;
use skyrelay_core::types::{ChatMessage, Role};

use crate::error::{status_error, ProviderError};
use crate::prompt::SYSTEM_PROMPT;

const DEFAULT_API_BASE: &str = "https://api.openai.com";
const MAX_TOKENS: u32 = 4096;

/// HTTP client for the OpenAI Chat Completions API.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_base: String,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Point the client at a different base URL (tests use a mock server).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");

        OpenAiClient {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base)
    }

    /// Send one chat request. Exactly one outbound HTTP call, no retries.
    pub async fn chat(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        model_id: &str,
    ) -> Result<String, ProviderError> {
        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        wire_messages.push(WireMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        });
        wire_messages.extend(messages.iter().map(WireMessage::from));

        let request = ChatRequest {
            model: model_id,
            messages: wire_messages,
            max_tokens: MAX_TOKENS,
        };

        debug!(model = %model_id, messages = messages.len(), "calling OpenAI");

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::http(Provider::OpenAi, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "OpenAI API error");
            return Err(status_error(Provider::OpenAi, status.as_u16(), &body));
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::http(Provider::OpenAi, e))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse(Provider::OpenAi))
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
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
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::user("Hello")]
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-5.2-2025-12-11",
                "max_tokens": 4096
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "Hello! How can I help?"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_api_base(server.uri());
        let reply = client
            .chat("sk-test", &messages(), "gpt-5.2-2025-12-11")
            .await
            .unwrap();

        assert_eq!(reply, "Hello! How can I help?");
    }

    #[tokio::test]
    async fn test_system_prompt_is_first_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "system", "content": SYSTEM_PROMPT}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::with_api_base(server.uri());
        client.chat("k", &messages(), "gpt-5-mini-2025-08-07").await.unwrap();
    }

    #[tokio::test]
    async fn test_chat_no_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::with_api_base(server.uri());
        let err = client.chat("k", &messages(), "m").await.unwrap_err();

        assert!(matches!(err, ProviderError::EmptyResponse(Provider::OpenAi)));
    }

    #[tokio::test]
    async fn test_chat_null_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": null}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_api_base(server.uri());
        let err = client.chat("k", &messages(), "m").await.unwrap_err();

        assert!(matches!(err, ProviderError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_invalid_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_api_base(server.uri());
        let err = client.chat("bad", &messages(), "m").await.unwrap_err();

        assert!(matches!(err, ProviderError::InvalidCredential(Provider::OpenAi)));
        assert!(err.to_string().contains("/config openai"));
    }

    #[tokio::test]
    async fn test_chat_bad_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("context too long"))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_api_base(server.uri());
        let err = client.chat("k", &messages(), "m").await.unwrap_err();

        assert!(matches!(err, ProviderError::InvalidRequest(_)));
        assert!(err.to_string().contains("too long"));
    }
}
