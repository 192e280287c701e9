//! Webhook server — the inbound HTTP surface.
//!
//! `POST /` is the Telegram webhook endpoint. It acknowledges with 200
//! whatever happens inside: a non-2xx answer would make Telegram redeliver
//! the update, so even malformed payloads and internal failures are
//! swallowed here (and surfaced to the user as outbound messages instead).

use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use skyrelay_core::config::Config;
use skyrelay_core::store::{FileStore, KvStore, WEBHOOK_REGISTERED_KEY};
use skyrelay_providers::Dispatcher;
use skyrelay_telegram::TelegramClient;

use crate::relay::Relay;

/// Re-register the webhook if the stored stamp is older than this.
const WEBHOOK_CHECK_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// Shared state for the axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub public_url: String,
}

/// Creates the router with all routes configured.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(webhook_handler).get(root_handler))
        .route("/health", get(health_handler))
        .route("/webhook-info", get(webhook_info_handler))
        .route("/set-webhook", post(set_webhook_handler))
        .with_state(state)
}

/// Starts the webhook server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    if !config.telegram.is_configured() {
        anyhow::bail!("no Telegram bot token configured (set telegram.token or TELEGRAM_BOT_TOKEN)");
    }

    let store: Arc<dyn KvStore> = Arc::new(
        FileStore::new(config.storage.dir_path()).context("failed to open store directory")?,
    );
    let telegram = TelegramClient::new(config.telegram.token.clone());
    let relay = Arc::new(Relay::new(telegram, Dispatcher::new(), store.clone()));

    ensure_webhook_registered(store.as_ref(), &relay.telegram, &config.server.public_url).await;

    let state = AppState {
        relay,
        public_url: config.server.public_url.clone(),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "webhook server listening");

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// The webhook target URL for a public base URL.
pub fn webhook_url(public_url: &str) -> String {
    format!("{}/", public_url.trim_end_matches('/'))
}

/// Register the webhook unless the stored stamp says it was done recently.
/// Failures are logged and never abort startup.
pub async fn ensure_webhook_registered(
    store: &dyn KvStore,
    telegram: &TelegramClient,
    public_url: &str,
) {
    if public_url.is_empty() {
        debug!("no public URL configured, skipping webhook registration");
        return;
    }

    let now_ms = Utc::now().timestamp_millis();

    match store.get(WEBHOOK_REGISTERED_KEY).await {
        Ok(Some(value)) => {
            if let Some(last_ms) = value.as_i64() {
                if now_ms - last_ms < WEBHOOK_CHECK_INTERVAL_MS {
                    debug!("webhook recently registered, skipping");
                    return;
                }
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "could not read webhook registration stamp"),
    }

    let url = webhook_url(public_url);
    match telegram.set_webhook(&url).await {
        Ok(()) => {
            info!(url = %url, "webhook auto-registered");
            if let Err(e) = store
                .put(WEBHOOK_REGISTERED_KEY, serde_json::json!(now_ms))
                .await
            {
                warn!(error = %e, "could not store webhook registration stamp");
            }
        }
        Err(e) => error!(error = %e, "failed to auto-register webhook"),
    }
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

/// Main webhook endpoint. Always answers 200 "OK".
///
/// The body is read raw rather than through a `Json` extractor so that
/// malformed payloads are still acknowledged instead of rejected with 4xx.
async fn webhook_handler(State(state): State<AppState>, body: Bytes) -> &'static str {
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(payload) => state.relay.process_update(&payload).await,
        Err(e) => warn!(error = %e, "unparseable webhook body, dropping"),
    }
    "OK"
}

async fn root_handler() -> &'static str {
    "Skyrelay - send me a message on Telegram!"
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Debugging aid: proxy Telegram's view of the webhook.
async fn webhook_info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.relay.telegram.webhook_info().await {
        Ok(info) => Json(info),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// Manual webhook (re-)registration.
async fn set_webhook_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    if state.public_url.is_empty() {
        return Json(serde_json::json!({
            "success": false,
            "error": "no public URL configured (set server.publicUrl)",
        }));
    }

    let url = webhook_url(&state.public_url);
    match state.relay.telegram.set_webhook(&url).await {
        Ok(()) => Json(serde_json::json!({"success": true, "webhookUrl": url})),
        Err(e) => Json(serde_json::json!({"success": false, "error": e.to_string()})),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
