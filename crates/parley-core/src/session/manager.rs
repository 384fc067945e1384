use super::event::SessionEvent;
use super::message::{Message, Sender};
use super::state::{SessionPhase, SessionState};
use crate::config::SessionConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::history::{HistoryEntry, HistoryManager, HistoryRepository};
use crate::provider::{ProviderError, ResponseProvider};
use chrono::{DateTime, Utc};
use crate::connectivity::ConnectivityObserver;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, mpsc};

/// Bot notice appended when a submission is attempted while offline.
pub const OFFLINE_NOTICE: &str =
    "You appear to be offline. Please check your internet connection and try again.";
/// Bot reply substituted when the provider returns nothing usable.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your request.";
/// Bot notice appended when the provider call fails.
pub const ERROR_NOTICE: &str =
    "Sorry, something went wrong while getting a response. Please try again.";

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Empty or whitespace-only text.
    Empty,
    /// Another exchange is already in flight.
    Busy,
}

/// What a call to [`Session::submit`] did.
///
/// None of these is an error from the caller's point of view; failures are
/// already reflected in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing changed.
    Rejected(RejectReason),
    /// Offline: only the notice was appended.
    Offline { notice: Message },
    /// The provider answered (possibly with the fallback reply).
    Replied { user: Message, reply: Message },
    /// The provider failed; an error notice was appended.
    Failed {
        user: Message,
        notice: Message,
        error: ProviderError,
    },
}

/// The session state machine.
///
/// `Session` owns the transcript and the input/busy state, and drives each
/// exchange:
/// - Validates a submission against connectivity and the busy flag
/// - Appends the user message and records it in the history
/// - Shows the typing marker for the configured delay
/// - Calls the [`ResponseProvider`] and appends its reply (or a notice)
/// - Returns to `Idle`
///
/// The state lock is never held across an await, so connectivity changes can
/// be applied synchronously while an exchange is suspended. If the `submit`
/// future is dropped mid-exchange the session still returns to `Idle`.
pub struct Session {
    state: RwLock<SessionState>,
    history: Mutex<HistoryManager>,
    provider: Arc<dyn ResponseProvider>,
    config: SessionConfig,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl Session {
    /// Creates a session.
    ///
    /// # Arguments
    ///
    /// * `history` - History manager, usually loaded from storage
    /// * `connectivity` - Source of the initial online status
    /// * `provider` - Backend producing replies
    /// * `config` - Typing delay, timeout and greeting settings
    pub fn new(
        history: HistoryManager,
        connectivity: &ConnectivityMonitor,
        provider: Arc<dyn ResponseProvider>,
        config: SessionConfig,
    ) -> Self {
        let mut state = SessionState::new(connectivity.is_online());
        if let Some(greeting) = config.greeting.as_deref().filter(|g| !g.trim().is_empty()) {
            state.push(Sender::Bot, greeting);
        }

        Self {
            state: RwLock::new(state),
            history: Mutex::new(history),
            provider,
            config,
            events: None,
        }
    }

    /// Creates a session whose history is loaded from `repository` using the
    /// bounds in `config`.
    pub async fn open(
        repository: Arc<dyn HistoryRepository>,
        connectivity: &ConnectivityMonitor,
        provider: Arc<dyn ResponseProvider>,
        config: SessionConfig,
    ) -> Self {
        let history =
            HistoryManager::load(repository, config.history_capacity, config.preview_chars).await;
        Self::new(history, connectivity, provider, config)
    }

    /// Publishes every later state change on `sender`.
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Submits user text.
    ///
    /// Surrounding whitespace is trimmed. Blank text, or any submission while
    /// another is in flight, is ignored. While offline a single notice is
    /// appended and neither the history nor the provider is touched.
    /// Otherwise the user message and history entry are recorded before the
    /// provider is called, and the call always ends with exactly one bot
    /// message.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring blank submission");
            return SubmitOutcome::Rejected(RejectReason::Empty);
        }

        let user = {
            let mut state = self.write_state();
            if state.is_busy() {
                tracing::debug!("Ignoring submission while awaiting a reply");
                return SubmitOutcome::Rejected(RejectReason::Busy);
            }
            if !state.is_online() {
                let notice = state.push(Sender::Bot, OFFLINE_NOTICE);
                drop(state);
                tracing::info!("Submission refused: offline");
                self.emit(SessionEvent::MessageAppended {
                    message: notice.clone(),
                });
                return SubmitOutcome::Offline { notice };
            }
            let user = state.push(Sender::User, text);
            state.set_busy(true);
            user
        };
        let mut in_flight = InFlight {
            session: self,
            settled: false,
        };

        tracing::debug!(message_id = user.id, "Exchange started");
        self.emit(SessionEvent::MessageAppended {
            message: user.clone(),
        });
        self.emit(SessionEvent::InputEnabledChanged { enabled: false });

        self.record_history(text).await;

        self.write_state().set_typing(true);
        self.emit(SessionEvent::TypingStarted);

        let delay = self.config.typing_delay.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = self.call_provider(text, user.timestamp).await;

        let (content, error) = match result {
            Ok(reply) if reply.trim().is_empty() => {
                tracing::warn!("Provider returned an empty reply, using fallback");
                (FALLBACK_REPLY.to_string(), None)
            }
            Ok(reply) => (reply, None),
            Err(e) => {
                tracing::warn!("Provider call failed: {}", e);
                (ERROR_NOTICE.to_string(), Some(e))
            }
        };

        let (reply, input_enabled) = {
            let mut state = self.write_state();
            let reply = state.push(Sender::Bot, content);
            state.set_typing(false);
            state.set_busy(false);
            (reply, state.input_enabled())
        };
        in_flight.settled = true;

        tracing::debug!(message_id = reply.id, "Exchange settled");
        self.emit(SessionEvent::MessageAppended {
            message: reply.clone(),
        });
        self.emit(SessionEvent::TypingStopped);
        if input_enabled {
            self.emit(SessionEvent::InputEnabledChanged { enabled: true });
        }

        match error {
            None => SubmitOutcome::Replied { user, reply },
            Some(error) => SubmitOutcome::Failed {
                user,
                notice: reply,
                error,
            },
        }
    }

    /// Applies a connectivity notification.
    ///
    /// An in-flight exchange is never cancelled; going offline only keeps
    /// input disabled once the exchange settles.
    pub fn on_connectivity_change(&self, online: bool) {
        let (before, after) = {
            let mut state = self.write_state();
            let before = state.input_enabled();
            state.set_online(online);
            (before, state.input_enabled())
        };

        tracing::debug!(online, "Session connectivity updated");
        if before != after {
            self.emit(SessionEvent::InputEnabledChanged { enabled: after });
        }
    }

    /// Empties the history. Confirmation is the caller's responsibility.
    pub async fn clear_history(&self) {
        self.history.lock().await.clear().await;
        tracing::info!("History cleared");
        self.emit(SessionEvent::HistoryUpdated {
            entries: Vec::new(),
        });
    }

    /// Newest-first history snapshot.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.all()
    }

    /// Full text of a past submission, for putting back into the input.
    pub async fn recall_history(&self, id: i64) -> Option<String> {
        self.history
            .lock()
            .await
            .find(id)
            .map(|entry| entry.message.clone())
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.read_state().transcript().to_vec()
    }

    pub fn snapshot(&self) -> SessionState {
        self.read_state().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.read_state().phase()
    }

    pub fn input_enabled(&self) -> bool {
        self.read_state().input_enabled()
    }

    pub fn is_online(&self) -> bool {
        self.read_state().is_online()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    async fn record_history(&self, text: &str) {
        let entries = {
            let mut history = self.history.lock().await;
            history.add(text).await;
            history.all()
        };
        self.emit(SessionEvent::HistoryUpdated { entries });
    }

    async fn call_provider(
        &self,
        text: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<String, ProviderError> {
        let call = self.provider.respond(text, sent_at);
        match self.config.provider_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ProviderError::Timeout(limit))),
            None => call.await,
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(sender) = &self.events {
            // Receivers may be gone; rendering is optional
            let _ = sender.send(event);
        }
    }
}

impl ConnectivityObserver for Session {
    fn on_connectivity_change(&self, online: bool) {
        Session::on_connectivity_change(self, online);
    }
}

/// Clears the busy and typing flags if an exchange is dropped before its
/// reply is appended.
struct InFlight<'a> {
    session: &'a Session,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let (was_typing, input_enabled) = {
            let mut state = self.session.write_state();
            let was_typing = state.is_typing();
            state.set_typing(false);
            state.set_busy(false);
            (was_typing, state.input_enabled())
        };

        tracing::warn!("Exchange abandoned before a reply arrived");
        if was_typing {
            self.session.emit(SessionEvent::TypingStopped);
        }
        if input_enabled {
            self.session.emit(SessionEvent::InputEnabledChanged { enabled: true });
        }
    }
}
