//! History persistence over a key-value store.

use crate::dto::{decode_history, encode_history};
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use parley_core::config::{DEFAULT_HISTORY_CAPACITY, DEFAULT_PREVIEW_CHARS};
use parley_core::error::Result;
use parley_core::history::{HistoryEntry, HistoryRepository};
use std::sync::Arc;

/// Storage key holding the serialized history.
pub const HISTORY_KEY: &str = "parley.chat_history";

/// [`HistoryRepository`] that keeps the whole history under one key.
///
/// Every save overwrites the key with a fresh versioned document. Loading
/// never fails: an absent key, a read error or an unreadable document all
/// produce an empty history (the latter two are logged).
///
/// # Example
///
/// ```ignore
/// use parley_infrastructure::{FileKeyValueStore, KeyValueHistoryRepository};
///
/// let store = FileKeyValueStore::new(paths.storage_dir());
/// let repository = KeyValueHistoryRepository::new(store);
/// let entries = repository.load().await;
/// ```
pub struct KeyValueHistoryRepository<S: KeyValueStore> {
    store: Arc<S>,
    capacity: usize,
    preview_chars: usize,
}

impl<S: KeyValueStore> KeyValueHistoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Uses a store that is also shared with other components.
    pub fn from_shared(store: Arc<S>) -> Self {
        Self {
            store,
            capacity: DEFAULT_HISTORY_CAPACITY,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Overrides the load-time capacity and the preview length used when
    /// migrating entries that lack a stored preview.
    pub fn with_bounds(mut self, capacity: usize, preview_chars: usize) -> Self {
        self.capacity = capacity;
        self.preview_chars = preview_chars;
        self
    }
}

#[async_trait]
impl<S: KeyValueStore + 'static> HistoryRepository for KeyValueHistoryRepository<S> {
    async fn load(&self) -> Vec<HistoryEntry> {
        let raw = match self.store.get(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read stored history: {}", e);
                return Vec::new();
            }
        };

        match decode_history(&raw, self.preview_chars) {
            Ok(mut entries) => {
                if entries.len() > self.capacity {
                    tracing::debug!(
                        "Truncating stored history from {} to {} entries",
                        entries.len(),
                        self.capacity
                    );
                    entries.truncate(self.capacity);
                }
                entries
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored history: {}", e);
                Vec::new()
            }
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let raw = encode_history(entries)?;
        self.store.set(HISTORY_KEY, &raw).await?;
        tracing::debug!("Saved {} history entries", entries.len());
        Ok(())
    }
}
