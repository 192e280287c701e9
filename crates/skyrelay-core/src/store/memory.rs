//! In-memory store, used by tests and as a scratch backend.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{KvStore, StoreError};

/// `HashMap`-backed store. Thread-safe via `RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.map.read().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.map.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.map.write().unwrap().remove(key);
        Ok(())
    }
}
