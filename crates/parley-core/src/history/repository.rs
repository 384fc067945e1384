//! History repository trait.
//!
//! Defines the persistence adapter contract the history manager delegates to.

use super::model::HistoryEntry;
use crate::error::Result;
use async_trait::async_trait;

/// Durable storage for the bounded history list.
///
/// The stored list is always written wholesale, newest first. Durability is
/// advisory: losing a write is not fatal to a session.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Loads the stored history, newest first.
    ///
    /// Fails soft: absent, unreadable or malformed storage yields an empty
    /// list. Implementations log the cause instead of returning it.
    async fn load(&self) -> Vec<HistoryEntry>;

    /// Replaces the stored history with `entries`.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: History written
    /// - `Err(_)`: Storage unavailable; the caller decides whether to care
    async fn save(&self, entries: &[HistoryEntry]) -> Result<()>;
}
