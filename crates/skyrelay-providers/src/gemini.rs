//! Gemini adapter — the `generateContent` API.
//!
//! Gemini differs from the other two vendors on every axis: the key travels
//! as a query parameter, assistant turns are role `"model"`, content is a
//! `parts` array, and bad credentials come back as a 400 whose body mentions
//! `API_KEY` rather than a 401.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use skyrelay_core::models::Provider;
use skyrelay_core::types::{ChatMessage, Role};

use crate::error::ProviderError;
use crate::prompt::SYSTEM_PROMPT;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const MAX_OUTPUT_TOKENS: u32 = 4096;

/// HTTP client for the Gemini `generateContent` API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Point the client at a different base URL (tests use a mock server).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");

        GeminiClient {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn generate_url(&self, model_id: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model_id)
    }

    /// Send one chat request. Exactly one outbound HTTP call, no retries.
    pub async fn chat(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        model_id: &str,
    ) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            system_instruction: Instruction {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            contents: messages.iter().map(Content::from).collect(),
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!(model = %model_id, messages = messages.len(), "calling Gemini");

        let response = self
            .http
            .post(self.generate_url(model_id))
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::http(Provider::Gemini, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Gemini API error");
            return Err(gemini_status_error(status.as_u16(), &body));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::http(Provider::Gemini, e))?;

        // Gemini can report errors inside a 200 body.
        if let Some(api_error) = data.error {
            return Err(ProviderError::vendor(
                Provider::Gemini,
                status.as_u16(),
                &api_error.message,
            ));
        }

        let text: String = data
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse(Provider::Gemini));
        }

        Ok(text)
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Gemini's status table: invalid keys surface as 400 with an `API_KEY`
/// marker in the body, not as 401.
fn gemini_status_error(status: u16, body: &str) -> ProviderError {
    match status {
        400 if body.contains("API_KEY") => ProviderError::InvalidCredential(Provider::Gemini),
        429 => ProviderError::RateLimited(Provider::Gemini),
        _ => ProviderError::vendor(Provider::Gemini, status, body),
    }
}

// ─────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Instruction,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Instruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

impl From<&ChatMessage> for Content {
    fn from(msg: &ChatMessage) -> Self {
        Content {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            },
            parts: vec![Part {
                text: msg.content.clone(),
            }],
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello!"), ChatMessage::user("Thanks")]
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-3-flash-preview:generateContent"))
            .and(query_param("key", "AIza-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "You're "}, {"text": "welcome!"}]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_base(server.uri());
        let reply = client
            .chat("AIza-test", &messages(), "gemini-3-flash-preview")
            .await
            .unwrap();

        // Parts are joined without a separator.
        assert_eq!(reply, "You're welcome!");
    }

    #[tokio::test]
    async fn test_assistant_role_maps_to_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "Hi"}]},
                    {"role": "model", "parts": [{"text": "Hello!"}]},
                    {"role": "user", "parts": [{"text": "Thanks"}]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_base(server.uri());
        client.chat("k", &messages(), "gemini-3-pro-preview").await.unwrap();
    }

    #[tokio::test]
    async fn test_request_carries_system_instruction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": {"parts": [{"text": SYSTEM_PROMPT}]},
                "generationConfig": {"maxOutputTokens": 4096}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_base(server.uri());
        client.chat("k", &messages(), "m").await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_key_is_400_with_marker() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error": {"status": "INVALID_ARGUMENT", "message": "API_KEY_INVALID"}}"#),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_base(server.uri());
        let err = client.chat("bad", &messages(), "m").await.unwrap_err();

        assert!(matches!(err, ProviderError::InvalidCredential(Provider::Gemini)));
        assert!(err.to_string().contains("/config gemini"));
    }

    #[tokio::test]
    async fn test_plain_400_is_vendor_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("malformed request"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_base(server.uri());
        let err = client.chat("k", &messages(), "m").await.unwrap_err();

        assert!(matches!(err, ProviderError::Vendor { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_base(server.uri());
        let err = client.chat("k", &messages(), "m").await.unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited(Provider::Gemini)));
    }

    #[tokio::test]
    async fn test_error_in_success_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"message": "internal quota exceeded"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_base(server.uri());
        let err = client.chat("k", &messages(), "m").await.unwrap_err();

        match err {
            ProviderError::Vendor { body, .. } => assert!(body.contains("quota")),
            other => panic!("expected Vendor error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_base(server.uri());
        let err = client.chat("k", &messages(), "m").await.unwrap_err();

        assert!(matches!(err, ProviderError::EmptyResponse(Provider::Gemini)));
    }
}
