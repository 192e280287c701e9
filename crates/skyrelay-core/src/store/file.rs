//! File-backed store — one JSON file per key under the data directory.
//!
//! There is deliberately no in-process cache: each request reads the current
//! on-disk state, so a restarted process (or a concurrent one) always sees
//! the latest write.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{KvStore, StoreError};
use crate::utils;

/// JSON-file-per-key store rooted at a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir` (default `~/.skyrelay/store/`).
    /// The directory is created if it doesn't exist.
    pub fn new(dir: Option<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.unwrap_or_else(utils::get_store_path);
        std::fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe_key = utils::safe_filename(&key.replace(':', "_"));
        self.dir.join(format!("{safe_key}.json"))
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.path_for(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        tokio::fs::write(&path, serde_json::to_string(&value)?).await?;
        debug!(key = %key, path = %path.display(), "stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %key, "deleted value");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
