//! History domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker appended to a preview that was cut short.
pub const ELLIPSIS: &str = "…";

/// One past user submission, as shown in the history list.
///
/// Entries are only ever created from outbound user messages, never from
/// bot replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in milliseconds since the Unix epoch, unique per history.
    pub id: i64,
    /// Full original user text.
    pub message: String,
    /// Display form of `message`, see [`make_preview`].
    pub preview: String,
    /// When the entry was created.
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Builds an entry for `message`, deriving the preview.
    pub fn new(
        id: i64,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        preview_chars: usize,
    ) -> Self {
        let message = message.into();
        let preview = make_preview(&message, preview_chars);
        Self {
            id,
            message,
            preview,
            timestamp,
        }
    }
}

/// Truncates `message` to `limit` characters, appending [`ELLIPSIS`] when
/// anything was cut. Messages of at most `limit` characters are returned
/// verbatim.
pub fn make_preview(message: &str, limit: usize) -> String {
    match message.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &message[..cut], ELLIPSIS),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_verbatim() {
        assert_eq!(make_preview("Hello", 50), "Hello");
        assert_eq!(make_preview("", 50), "");
    }

    #[test]
    fn test_exact_limit_is_verbatim() {
        let message = "a".repeat(50);
        assert_eq!(make_preview(&message, 50), message);
    }

    #[test]
    fn test_long_message_is_truncated() {
        let message = "b".repeat(51);
        let preview = make_preview(&message, 50);
        assert_eq!(preview, format!("{}…", "b".repeat(50)));
        assert_eq!(preview.chars().count(), 51);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let message = "é".repeat(60);
        let preview = make_preview(&message, 50);
        assert_eq!(preview, format!("{}…", "é".repeat(50)));
    }

    #[test]
    fn test_entry_derives_preview() {
        let entry = HistoryEntry::new(1, "x".repeat(80), Utc::now(), 50);
        assert_eq!(entry.message.len(), 80);
        assert!(entry.preview.ends_with(ELLIPSIS));
    }
}
