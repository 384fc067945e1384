use super::model::HistoryEntry;
use super::repository::HistoryRepository;
use crate::config::{DEFAULT_HISTORY_CAPACITY, DEFAULT_PREVIEW_CHARS};
use chrono::Utc;
use std::sync::Arc;

/// Owns the bounded, newest-first list of past user submissions.
///
/// `HistoryManager` is responsible for:
/// - Building entries (id, preview) from submitted text
/// - Enforcing the capacity bound by evicting the oldest entries
/// - Writing the whole list through the [`HistoryRepository`] after each change
///
/// Persistence is best-effort. A failed write is logged and the in-memory
/// list stays authoritative for the rest of the session.
pub struct HistoryManager {
    /// Newest first, never longer than `capacity`
    entries: Vec<HistoryEntry>,
    repository: Arc<dyn HistoryRepository>,
    capacity: usize,
    preview_chars: usize,
    /// Largest id handed out so far, keeps ids strictly increasing
    last_id: i64,
}

impl HistoryManager {
    /// Creates an empty manager with the default bounds.
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self::with_bounds(repository, DEFAULT_HISTORY_CAPACITY, DEFAULT_PREVIEW_CHARS)
    }

    /// Creates an empty manager.
    ///
    /// # Arguments
    ///
    /// * `repository` - Where the list is persisted
    /// * `capacity` - Maximum number of entries kept
    /// * `preview_chars` - Characters kept in each entry's preview
    pub fn with_bounds(
        repository: Arc<dyn HistoryRepository>,
        capacity: usize,
        preview_chars: usize,
    ) -> Self {
        Self {
            entries: Vec::new(),
            repository,
            capacity,
            preview_chars,
            last_id: 0,
        }
    }

    /// Creates a manager seeded from the repository's stored list.
    ///
    /// Stored lists longer than `capacity` are cut to their newest entries.
    pub async fn load(
        repository: Arc<dyn HistoryRepository>,
        capacity: usize,
        preview_chars: usize,
    ) -> Self {
        let mut entries = repository.load().await;
        entries.truncate(capacity);
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);

        tracing::debug!("Loaded {} history entries", entries.len());

        Self {
            entries,
            repository,
            capacity,
            preview_chars,
            last_id,
        }
    }

    /// Records a user submission and persists the new list.
    ///
    /// The entry is prepended; if the list then exceeds its capacity the
    /// oldest entries are dropped.
    ///
    /// # Returns
    ///
    /// The newly created entry, for display.
    pub async fn add(&mut self, message: &str) -> HistoryEntry {
        let now = Utc::now();
        let id = self.next_id(now.timestamp_millis());
        let entry = HistoryEntry::new(id, message, now, self.preview_chars);

        self.entries.insert(0, entry.clone());
        if self.entries.len() > self.capacity {
            let evicted = self.entries.len() - self.capacity;
            self.entries.truncate(self.capacity);
            tracing::debug!("Evicted {} oldest history entries", evicted);
        }

        self.persist().await;
        entry
    }

    /// Empties the history and persists the empty list.
    ///
    /// Asking the user for confirmation is the caller's job.
    pub async fn clear(&mut self) {
        self.entries.clear();
        self.persist().await;
    }

    /// Newest-first snapshot of all entries.
    pub fn all(&self) -> Vec<HistoryEntry> {
        self.entries.clone()
    }

    /// Finds an entry by id.
    pub fn find(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time-derived id, bumped past the previous one when the clock has not
    /// advanced (or went backwards). Saturates at `i64::MAX`, which only a
    /// corrupt stored id can reach.
    fn next_id(&mut self, now_millis: i64) -> i64 {
        let id = now_millis.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    async fn persist(&self) {
        if let Err(e) = self.repository.save(&self.entries).await {
            tracing::warn!("Failed to persist history, keeping it in memory only: {}", e);
        }
    }
}
