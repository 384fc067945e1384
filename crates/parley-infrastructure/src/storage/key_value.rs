//! Durable string key-value storage.
//!
//! The history adapter only needs "one key holding one serialized value", so
//! storage is modeled as a tiny async key-value interface with a file-backed
//! implementation for the terminal app and an in-memory one for tests and
//! embedding.

use super::atomic_file::AtomicFile;
use async_trait::async_trait;
use parley_core::error::{ParleyError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Async string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as its own file inside a directory.
///
/// Writes go through [`AtomicFile`] under an exclusive lock, so a crash never
/// leaves a half-written value behind and two processes sharing the directory
/// never interleave writes to the same key.
///
/// # Directory Structure
///
/// ```text
/// <dir>/
/// ├── parley.chat_history.json
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    ///
    /// Characters that are unsafe in file names are replaced with `_`.
    pub fn file_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }

    fn atomic_file(&self, key: &str) -> AtomicFile {
        AtomicFile::json(self.file_for(key))
    }
}

/// Runs blocking file I/O off the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ParleyError::internal(format!("Failed to join storage task: {}", e)))?
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.atomic_file(key);
        run_blocking(move || Ok(file.read_text()?)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = self.atomic_file(key);
        let len = value.len();
        let value = value.to_string();
        run_blocking(move || {
            let _lock = file.lock()?;
            file.write_text(&value)?;
            Ok(())
        })
        .await?;
        tracing::debug!("Stored key '{}' ({} bytes)", key, len);
        Ok(())
    }
}

/// Process-local key-value storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("storage"));

        assert_eq!(store.get("parley.chat_history").await.unwrap(), None);

        store.set("parley.chat_history", "[1,2,3]").await.unwrap();
        assert_eq!(
            store.get("parley.chat_history").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );

        store.set("parley.chat_history", "[]").await.unwrap();
        assert_eq!(
            store.get("parley.chat_history").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_file_store_value_lands_in_key_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("nested"));

        store.set("k", "v").await.unwrap();

        assert_eq!(std::fs::read_to_string(store.file_for("k")).unwrap(), "v");
    }

    #[test]
    fn test_file_for_sanitizes_key() {
        let store = FileKeyValueStore::new("/tmp/kv");
        assert_eq!(
            store.file_for("parley.chat_history"),
            PathBuf::from("/tmp/kv/parley.chat_history.json")
        );
        assert_eq!(
            store.file_for("../escape/me"),
            PathBuf::from("/tmp/kv/.._escape_me.json")
        );
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryKeyValueStore::new();

        store.set("a", "1").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").await.unwrap(), None);

        store.set("a", "2").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("2"));
    }
}
