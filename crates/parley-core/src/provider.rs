//! Response provider port.
//!
//! The boundary where a backend (webhook, automation workflow, LLM) turns a
//! user message into a reply. Implementations live in `parley-interaction`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Failures a provider can report. The session recovers from all of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request never produced a response (DNS, connect, reset, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend answered but the body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No answer within the allowed time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// Turns a user message into a bot reply, asynchronously.
///
/// An empty reply is legal; the session substitutes its fallback message.
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    /// # Arguments
    ///
    /// * `user_text` - The message exactly as submitted
    /// * `sent_at` - When the user message was created
    async fn respond(&self, user_text: &str, sent_at: DateTime<Utc>)
    -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ProviderError::Http {
                status: 503,
                message: "unavailable".into()
            }
            .to_string(),
            "HTTP 503: unavailable"
        );
        assert_eq!(
            ProviderError::Transport("connection refused".into()).to_string(),
            "Transport error: connection refused"
        );
        assert_eq!(
            ProviderError::Timeout(Duration::from_millis(1500)).to_string(),
            "Timed out after 1.5s"
        );
    }
}
