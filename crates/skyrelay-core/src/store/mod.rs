//! Key-value storage — the only shared mutable state in the system.
//!
//! Keys are opaque, namespaced strings (`config:<user>`, `history:<user>`).
//! Every access is a full read-modify-write with no optimistic concurrency
//! check: concurrent requests for the same user can race and the later write
//! wins. That is the defined behavior, not a bug.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Minimal JSON key-value store contract.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value for a key, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write a value, overwriting any previous one.
    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;

    /// Remove a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Key for a user's configuration.
pub fn config_key(user_id: i64) -> String {
    format!("config:{user_id}")
}

/// Key for a user's conversation history.
pub fn history_key(user_id: i64) -> String {
    format!("history:{user_id}")
}

/// Key holding the webhook auto-registration timestamp.
pub const WEBHOOK_REGISTERED_KEY: &str = "webhook_registered";
