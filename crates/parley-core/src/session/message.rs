//! Transcript message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    /// Text the user submitted.
    User,
    /// A provider reply or a notice generated by the session.
    Bot,
}

/// A single entry of the transcript.
///
/// Messages are created by the session on submission or reply and never
/// mutated afterwards. They are not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Per-session counter, strictly increasing in transcript order.
    pub id: u64,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
