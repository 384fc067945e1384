//! Parley core: the conversational session state manager.
//!
//! The core owns the chat transcript, the bounded submission history, the
//! input/busy state machine and the request/response lifecycle. Storage,
//! network status and reply generation are reached through injected
//! collaborators:
//!
//! - [`history::HistoryRepository`] persists the history list
//! - [`connectivity::ConnectivityMonitor`] reports online/offline transitions
//! - [`provider::ResponseProvider`] turns a message into a reply

pub mod config;
pub mod connectivity;
pub mod error;
pub mod history;
pub mod provider;
pub mod session;

// Re-export common error type
pub use error::ParleyError;

pub use connectivity::{ConnectivityMonitor, ConnectivityObserver};
pub use provider::{ProviderError, ResponseProvider};
pub use session::{Session, SessionEvent, SubmitOutcome};
