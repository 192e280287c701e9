//! Telegram Bot API client — outbound delivery and webhook management.
//!
//! Delivery contract: replies are split into transport-safe chunks and sent
//! strictly in order. Each chunk is first attempted with Markdown parsing;
//! if Telegram rejects the formatted payload (usually unbalanced markup from
//! the model) the same chunk is retried once as plain text. A failed plain
//! retry aborts the whole delivery — the caller must know it stopped.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::split::{split_message, MAX_MESSAGE_LEN};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// A delivery that could not be completed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Telegram rejected the message on both the formatted and the plain
    /// attempt.
    #[error("Telegram API error: {0}")]
    Send(String),

    /// Transport-level failure reaching the Bot API.
    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for one bot token.
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(TELEGRAM_API_BASE, token)
    }

    /// Point the client at a different base URL (tests use a mock server).
    pub fn with_api_base(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        TelegramClient {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Send a text reply, splitting it into chunks as needed.
    ///
    /// Chunks go out sequentially; the first chunk that fails both attempts
    /// aborts the rest.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        let chunks = split_message(text, MAX_MESSAGE_LEN);
        let total = chunks.len();

        for (i, chunk) in chunks.iter().enumerate() {
            self.send_chunk(chat_id, chunk).await?;
            debug!(chat_id, chunk = i + 1, total, "chunk delivered");
        }

        Ok(())
    }

    /// One chunk: Markdown attempt, then a single plain-text retry.
    async fn send_chunk(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        let formatted = self
            .http
            .post(self.endpoint("sendMessage"))
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .send()
            .await?;

        if formatted.status().is_success() {
            return Ok(());
        }

        debug!(status = %formatted.status(), "Markdown send rejected, retrying as plain text");

        let plain = self
            .http
            .post(self.endpoint("sendMessage"))
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
            }))
            .send()
            .await?;

        if plain.status().is_success() {
            return Ok(());
        }

        let description = plain.text().await.unwrap_or_default();
        error!(chat_id, description = %description, "sendMessage failed");
        Err(DeliveryError::Send(description))
    }

    /// Best-effort typing indicator. Failures are logged and swallowed —
    /// they never affect the request outcome.
    pub async fn send_typing(&self, chat_id: i64) {
        let result = self
            .http
            .post(self.endpoint("sendChatAction"))
            .json(&json!({"chat_id": chat_id, "action": "typing"}))
            .send()
            .await;

        if let Err(e) = result {
            debug!(chat_id, error = %e, "typing indicator failed");
        }
    }

    /// Register `url` as this bot's webhook target.
    pub async fn set_webhook(&self, url: &str) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(self.endpoint("setWebhook"))
            .json(&json!({"url": url}))
            .send()
            .await?;

        let result: ApiResult = response.json().await?;
        if !result.ok {
            let description = result
                .description
                .unwrap_or_else(|| "setWebhook failed".to_string());
            error!(description = %description, "failed to set webhook");
            return Err(DeliveryError::Send(description));
        }
        Ok(())
    }

    /// Remove the registered webhook (e.g. to switch the bot elsewhere).
    pub async fn delete_webhook(&self) -> Result<bool, DeliveryError> {
        let response = self.http.post(self.endpoint("deleteWebhook")).send().await?;
        let result: ApiResult = response.json().await?;
        Ok(result.ok)
    }

    /// Current webhook status, as reported by Telegram.
    pub async fn webhook_info(&self) -> Result<serde_json::Value, DeliveryError> {
        let response = self.http.get(self.endpoint("getWebhookInfo")).send().await?;
        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct ApiResult {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "test-token";

    fn client_for(server: &MockServer) -> TelegramClient {
        TelegramClient::with_api_base(server.uri(), TOKEN)
    }

    fn send_path() -> String {
        format!("/bot{TOKEN}/sendMessage")
    }

    #[tokio::test]
    async fn test_short_message_one_markdown_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(send_path()))
            .and(body_partial_json(serde_json::json!({
                "chat_id": 42,
                "text": "hello",
                "parse_mode": "Markdown"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).send_message(42, "hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_format_fallback_retries_plain_once() {
        let server = MockServer::start().await;

        // The Markdown attempt is rejected…
        Mock::given(method("POST"))
            .and(path(send_path()))
            .and(body_partial_json(serde_json::json!({"parse_mode": "Markdown"})))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"ok":false,"description":"Bad Request: can't parse entities"}"#,
            ))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        // …and the identical plain-text retry succeeds.
        Mock::given(method("POST"))
            .and(path(send_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .with_priority(5)
            .expect(1)
            .mount(&server)
            .await;

        // Exactly two attempts, overall success.
        client_for(&server).send_message(7, "broken *markdown").await.unwrap();
    }

    #[tokio::test]
    async fn test_plain_retry_failure_is_delivery_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(send_path()))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_string(r#"{"ok":false,"description":"Forbidden: bot was blocked"}"#),
            )
            .expect(2)
            .mount(&server)
            .await;

        let err = client_for(&server).send_message(7, "hi").await.unwrap_err();
        match err {
            DeliveryError::Send(description) => assert!(description.contains("blocked")),
            other => panic!("expected Send error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_chunk_stops_delivery() {
        let server = MockServer::start().await;

        // Both attempts of the first chunk fail; the second chunk must never
        // be attempted, so exactly 2 requests total.
        Mock::given(method("POST"))
            .and(path(send_path()))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"ok":false}"#))
            .expect(2)
            .mount(&server)
            .await;

        let long_text = "z".repeat(5000);
        let err = client_for(&server).send_message(1, &long_text).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Send(_)));
    }

    #[tokio::test]
    async fn test_long_message_delivered_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(send_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(3)
            .mount(&server)
            .await;

        let text = "w".repeat(9000);
        client_for(&server).send_message(5, &text).await.unwrap();

        // Chunks arrived in order and reassemble into the original text.
        let requests = server.received_requests().await.unwrap();
        let sent: String = requests
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["text"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(sent, text);
    }

    #[tokio::test]
    async fn test_typing_failure_is_swallowed() {
        // Nothing is listening here; the call must still return.
        let client = TelegramClient::with_api_base("http://127.0.0.1:1", TOKEN);
        client.send_typing(9).await;
    }

    #[tokio::test]
    async fn test_set_webhook_ok() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/setWebhook")))
            .and(body_partial_json(serde_json::json!({"url": "https://bot.example.com/"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .set_webhook("https://bot.example.com/")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_webhook_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/setWebhook")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "description": "bad webhook: HTTPS url must be provided"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .set_webhook("http://insecure.example.com/")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTPS"));
    }

    #[tokio::test]
    async fn test_webhook_info() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/bot{TOKEN}/getWebhookInfo")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"url": "https://bot.example.com/", "pending_update_count": 0}
            })))
            .mount(&server)
            .await;

        let info = client_for(&server).webhook_info().await.unwrap();
        assert_eq!(info["result"]["url"], "https://bot.example.com/");
    }

    #[tokio::test]
    async fn test_delete_webhook() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/deleteWebhook")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        assert!(client_for(&server).delete_webhook().await.unwrap());
    }
}
