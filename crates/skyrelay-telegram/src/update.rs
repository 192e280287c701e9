//! Inbound webhook update ingestion.
//!
//! Pure validation and projection — no I/O. A payload without a numeric
//! `update_id` is rejected outright; an update without a text body is
//! dropped before it reaches the dispatcher.

use serde::Deserialize;

/// One Telegram update, as delivered to the webhook.
#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Incoming>,
}

/// An inbound message within an update.
#[derive(Clone, Debug, Deserialize)]
pub struct Incoming {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
}

impl Incoming {
    /// Destination chat for the reply.
    pub fn chat_id(&self) -> i64 {
        self.chat.id
    }

    /// Identity the config/history keys are scoped to. Falls back to the
    /// chat id when the sender is unknown (e.g. channel posts).
    pub fn sender_id(&self) -> i64 {
        self.from.as_ref().map_or(self.chat.id, |user| user.id)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Parse a raw webhook payload into an [`Update`].
///
/// Returns `None` for non-objects and for payloads whose `update_id` is
/// missing or non-numeric.
pub fn parse_update(value: &serde_json::Value) -> Option<Update> {
    serde_json::from_value(value.clone()).ok()
}

/// Project an update down to its text message, if it has one.
pub fn extract_text_message(update: &Update) -> Option<&Incoming> {
    update
        .message
        .as_ref()
        .filter(|msg| msg.text.as_deref().is_some_and(|t| !t.is_empty()))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
