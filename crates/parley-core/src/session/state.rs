//! Session state types.

use super::message::{Message, Sender};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Where a session is in its request/response lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Ready for input (subject to connectivity).
    Idle,
    /// A submission is in flight; further submissions are rejected.
    AwaitingReply,
}

/// Everything the session state machine owns besides the history.
///
/// `input_enabled` is derived from `online` and `busy` rather than stored, so
/// it cannot drift from its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    transcript: Vec<Message>,
    online: bool,
    busy: bool,
    typing: bool,
    next_message_id: u64,
}

impl SessionState {
    pub(crate) fn new(online: bool) -> Self {
        Self {
            transcript: Vec::new(),
            online,
            busy: false,
            typing: false,
            next_message_id: 1,
        }
    }

    /// The append-only transcript, oldest first.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the transient typing marker is showing.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn input_enabled(&self) -> bool {
        self.online && !self.busy
    }

    pub fn phase(&self) -> SessionPhase {
        if self.busy {
            SessionPhase::AwaitingReply
        } else {
            SessionPhase::Idle
        }
    }

    /// Appends a new message and returns a copy of it.
    pub(crate) fn push(&mut self, sender: Sender, content: impl Into<String>) -> Message {
        let message = Message {
            id: self.next_message_id,
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        };
        self.next_message_id += 1;
        self.transcript.push(message.clone());
        message
    }

    pub(crate) fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub(crate) fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_enabled_tracks_online_and_busy() {
        let mut state = SessionState::new(true);
        assert!(state.input_enabled());
        assert_eq!(state.phase(), SessionPhase::Idle);

        state.set_busy(true);
        assert!(!state.input_enabled());
        assert_eq!(state.phase(), SessionPhase::AwaitingReply);

        state.set_online(false);
        state.set_busy(false);
        assert!(!state.input_enabled());
        assert_eq!(state.phase(), SessionPhase::Idle);

        state.set_online(true);
        assert!(state.input_enabled());
    }

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut state = SessionState::new(true);
        let first = state.push(Sender::User, "hi");
        let second = state.push(Sender::Bot, "hello");

        assert!(second.id > first.id);
        assert_eq!(state.transcript(), &[first, second]);
    }
}
