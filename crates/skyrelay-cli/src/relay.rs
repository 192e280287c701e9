//! Per-update orchestration: ingest → command or chat path → deliver.
//!
//! Within one update everything is strictly ordered: read history, call the
//! provider, append history, deliver. Nothing here escapes as a fault — a
//! dispatch error becomes a normal outbound `❌ …` message, and a total
//! delivery failure is logged as the one terminal case.

use std::sync::Arc;

use tracing::{debug, error, warn};

use skyrelay_core::storage;
use skyrelay_core::store::KvStore;
use skyrelay_core::utils::truncate_string;
use skyrelay_providers::Dispatcher;
use skyrelay_telegram::{extract_text_message, parse_update, TelegramClient};

use crate::commands;

/// Everything one webhook update needs, threaded explicitly.
pub struct Relay {
    pub telegram: TelegramClient,
    pub dispatcher: Dispatcher,
    pub store: Arc<dyn KvStore>,
}

impl Relay {
    pub fn new(telegram: TelegramClient, dispatcher: Dispatcher, store: Arc<dyn KvStore>) -> Self {
        Relay {
            telegram,
            dispatcher,
            store,
        }
    }

    /// Process one webhook payload end to end.
    ///
    /// Malformed payloads and non-text updates are logged and dropped (there
    /// is no valid destination to reply to). Everything else resolves to an
    /// outbound message — the reply, or a best-effort error note.
    pub async fn process_update(&self, payload: &serde_json::Value) {
        let Some(update) = parse_update(payload) else {
            warn!("invalid update payload, dropping");
            return;
        };
        let Some(message) = extract_text_message(&update) else {
            debug!(update_id = update.update_id, "no text message in update, dropping");
            return;
        };

        let chat_id = message.chat_id();
        let user_id = message.sender_id();
        let text = message.text.clone().unwrap_or_default();

        debug!(
            user_id,
            chat_id,
            preview = %truncate_string(&text, 50),
            "inbound message"
        );

        let outcome = if commands::is_command(&text) {
            self.handle_command(chat_id, user_id, &text).await
        } else {
            self.handle_chat(chat_id, user_id, &text).await
        };

        if let Err(e) = outcome {
            error!(chat_id, error = %e, "error handling message");
            if let Err(send_err) = self
                .telegram
                .send_message(chat_id, &format!("❌ Error: {e}"))
                .await
            {
                error!(chat_id, error = %send_err, "failed to deliver error message");
            }
        }
    }

    async fn handle_command(&self, chat_id: i64, user_id: i64, text: &str) -> anyhow::Result<()> {
        let reply = commands::handle_command(self.store.as_ref(), user_id, text).await?;
        self.telegram.send_message(chat_id, &reply).await?;
        Ok(())
    }

    async fn handle_chat(&self, chat_id: i64, user_id: i64, text: &str) -> anyhow::Result<()> {
        self.telegram.send_typing(chat_id).await;

        let config = storage::load_user_config(self.store.as_ref(), user_id).await?;
        let messages = storage::messages_for_chat(self.store.as_ref(), user_id, text).await?;

        match self.dispatcher.dispatch(&config, &messages).await {
            Ok(reply) => {
                storage::record_exchange(self.store.as_ref(), user_id, text, &reply).await?;
                self.telegram.send_message(chat_id, &reply).await?;
            }
            Err(e) => {
                // Dispatch errors are user-facing text, not faults.
                self.telegram.send_message(chat_id, &format!("❌ {e}")).await?;
            }
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
