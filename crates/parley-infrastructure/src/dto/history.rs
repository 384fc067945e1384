//! Chat history DTOs and schema migration.
//!
//! The stored value is a versioned JSON document:
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "entries": [
//!     { "id": 1718000000000, "message": "Hello", "preview": "Hello", "timestamp": "2024-06-10T06:13:20Z" }
//!   ]
//! }
//! ```
//!
//! Older builds stored a bare JSON array of entries without a version tag.
//! That shape is still accepted and migrated to the current schema on load.

use chrono::{DateTime, Utc};
use parley_core::error::{ParleyError, Result};
use parley_core::history::{HistoryEntry, make_preview};
use semver::Version;
use serde::{Deserialize, Serialize};

/// Schema version written by this build.
pub const HISTORY_SCHEMA_VERSION: &str = "1.0.0";

/// History entry V1.0.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryV1_0_0 {
    pub id: i64,
    pub message: String,
    /// Missing in some legacy documents; rebuilt from `message` when absent.
    #[serde(default)]
    pub preview: String,
    pub timestamp: DateTime<Utc>,
}

/// History document V1.0.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDocumentV1_0_0 {
    pub version: String,
    pub entries: Vec<HistoryEntryV1_0_0>,
}

/// Any shape the history key has held.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredHistory {
    Versioned(HistoryDocumentV1_0_0),
    Legacy(Vec<HistoryEntryV1_0_0>),
}

impl HistoryEntryV1_0_0 {
    fn into_domain(self, preview_chars: usize) -> HistoryEntry {
        let preview = if self.preview.is_empty() {
            make_preview(&self.message, preview_chars)
        } else {
            self.preview
        };
        HistoryEntry {
            id: self.id,
            message: self.message,
            preview,
            timestamp: self.timestamp,
        }
    }
}

impl From<&HistoryEntry> for HistoryEntryV1_0_0 {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id,
            message: entry.message.clone(),
            preview: entry.preview.clone(),
            timestamp: entry.timestamp,
        }
    }
}

/// Serializes `entries` as a current-version document.
pub fn encode_history(entries: &[HistoryEntry]) -> Result<String> {
    let document = HistoryDocumentV1_0_0 {
        version: HISTORY_SCHEMA_VERSION.to_string(),
        entries: entries.iter().map(HistoryEntryV1_0_0::from).collect(),
    };
    Ok(serde_json::to_string(&document)?)
}

/// Parses a stored history value, migrating legacy shapes.
///
/// Fails on malformed JSON, unparseable version tags, and documents from a
/// different major version.
pub fn decode_history(raw: &str, preview_chars: usize) -> Result<Vec<HistoryEntry>> {
    let entries = match serde_json::from_str::<StoredHistory>(raw)
        .map_err(|e| ParleyError::serialization("JSON", e.to_string()))?
    {
        StoredHistory::Versioned(document) => {
            check_version(&document.version)?;
            document.entries
        }
        StoredHistory::Legacy(entries) => {
            tracing::info!(
                "Migrating {} legacy history entries to schema {}",
                entries.len(),
                HISTORY_SCHEMA_VERSION
            );
            entries
        }
    };

    Ok(entries
        .into_iter()
        .map(|entry| entry.into_domain(preview_chars))
        .collect())
}

fn check_version(tag: &str) -> Result<()> {
    let stored = Version::parse(tag)
        .map_err(|e| ParleyError::data_access(format!("Invalid history version '{}': {}", tag, e)))?;
    let current = Version::parse(HISTORY_SCHEMA_VERSION)
        .map_err(|e| ParleyError::internal(format!("Invalid schema constant: {}", e)))?;

    if stored.major != current.major {
        return Err(ParleyError::data_access(format!(
            "Unsupported history schema version {} (expected {}.x)",
            stored, current.major
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: i64, message: &str) -> HistoryEntry {
        let timestamp = Utc.timestamp_millis_opt(id).unwrap();
        HistoryEntry::new(id, message, timestamp, 50)
    }

    #[test]
    fn test_encode_writes_version_tag() {
        let raw = encode_history(&[entry(1_700_000_000_000, "Hello")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["entries"][0]["message"], "Hello");
        assert_eq!(value["entries"][0]["preview"], "Hello");
        assert_eq!(value["entries"][0]["id"], 1_700_000_000_000i64);
    }

    #[test]
    fn test_decode_current_document() {
        let entries = vec![entry(2, "second"), entry(1, "first")];
        let raw = encode_history(&entries).unwrap();

        assert_eq!(decode_history(&raw, 50).unwrap(), entries);
    }

    #[test]
    fn test_decode_accepts_minor_bump() {
        let raw = r#"{"version":"1.3.0","entries":[]}"#;
        assert!(decode_history(raw, 50).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_other_major() {
        let raw = r#"{"version":"2.0.0","entries":[]}"#;
        let err = decode_history(raw, 50).unwrap_err();
        assert!(err.to_string().contains("Unsupported history schema"));
    }

    #[test]
    fn test_decode_rejects_bad_version_tag() {
        let raw = r#"{"version":"one","entries":[]}"#;
        assert!(decode_history(raw, 50).is_err());
    }

    #[test]
    fn test_decode_migrates_legacy_array() {
        let long = "x".repeat(60);
        let raw = format!(
            r#"[{{"id":5,"message":"{}","timestamp":"2024-06-10T06:13:20Z"}},
                {{"id":4,"message":"short","preview":"short","timestamp":"2024-06-10T06:13:19Z"}}]"#,
            long
        );

        let entries = decode_history(&raw, 50).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].preview, format!("{}…", "x".repeat(50)));
        assert_eq!(entries[1].message, "short");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_history("not json", 50).unwrap_err().is_serialization());
        assert!(decode_history(r#"{"entries":"nope"}"#, 50).is_err());
    }
}
