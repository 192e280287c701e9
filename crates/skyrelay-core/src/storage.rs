//! Typed accessors over the key-value store.
//!
//! Each function is a complete read-modify-write: nothing is cached between
//! calls, and a value that fails to parse falls back to its default rather
//! than poisoning the request.

use tracing::warn;

use crate::store::{config_key, history_key, KvStore, StoreError};
use crate::types::{ChatMessage, ConversationHistory, UserConfig, UserConfigPatch};

/// Load a user's config, defaulting on a missing or unreadable value.
pub async fn load_user_config(store: &dyn KvStore, user_id: i64) -> Result<UserConfig, StoreError> {
    match store.get(&config_key(user_id)).await? {
        Some(value) => Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "stored config unreadable, using defaults");
            UserConfig::default()
        })),
        None => Ok(UserConfig::default()),
    }
}

/// Persist a user's config.
pub async fn save_user_config(
    store: &dyn KvStore,
    user_id: i64,
    config: &UserConfig,
) -> Result<(), StoreError> {
    store
        .put(&config_key(user_id), serde_json::to_value(config)?)
        .await
}

/// Partial-merge update: read current config, apply the patch, write back.
/// Returns the updated config.
pub async fn update_user_config(
    store: &dyn KvStore,
    user_id: i64,
    patch: UserConfigPatch,
) -> Result<UserConfig, StoreError> {
    let mut config = load_user_config(store, user_id).await?;
    config.apply(patch);
    save_user_config(store, user_id, &config).await?;
    Ok(config)
}

/// Load a user's history, defaulting to empty on a miss.
pub async fn load_history(
    store: &dyn KvStore,
    user_id: i64,
) -> Result<ConversationHistory, StoreError> {
    match store.get(&history_key(user_id)).await? {
        Some(value) => Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "stored history unreadable, starting fresh");
            ConversationHistory::default()
        })),
        None => Ok(ConversationHistory::default()),
    }
}

/// Append one user/assistant exchange to a user's history and persist it.
pub async fn record_exchange(
    store: &dyn KvStore,
    user_id: i64,
    user_text: &str,
    assistant_text: &str,
) -> Result<(), StoreError> {
    let mut history = load_history(store, user_id).await?;
    history.push_exchange(user_text, assistant_text);
    store
        .put(&history_key(user_id), serde_json::to_value(&history)?)
        .await
}

/// Drop a user's history entirely.
pub async fn clear_history(store: &dyn KvStore, user_id: i64) -> Result<(), StoreError> {
    store.delete(&history_key(user_id)).await
}

/// The message sequence for one chat turn: stored history plus the new
/// user message at the end.
pub async fn messages_for_chat(
    store: &dyn KvStore,
    user_id: i64,
    new_text: &str,
) -> Result<Vec<ChatMessage>, StoreError> {
    let history = load_history(store, user_id).await?;
    let mut messages = history.messages;
    messages.push(ChatMessage::user(new_text));
    Ok(messages)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
