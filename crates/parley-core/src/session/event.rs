use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::history::HistoryEntry;

/// State changes a session publishes for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended to the transcript.
    MessageAppended { message: Message },
    /// The typing marker should be shown.
    TypingStarted,
    /// The typing marker should be removed.
    TypingStopped,
    /// The input field should be enabled or disabled.
    InputEnabledChanged { enabled: bool },
    /// The history list changed; carries the full newest-first list.
    HistoryUpdated { entries: Vec<HistoryEntry> },
}
