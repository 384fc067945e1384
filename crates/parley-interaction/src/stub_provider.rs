//! Placeholder provider used until a real backend is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parley_core::config::DEFAULT_PLACEHOLDER_REPLY;
use parley_core::provider::{ProviderError, ResponseProvider};

/// Answers every message with the same fixed text.
#[derive(Debug, Clone)]
pub struct StubResponseProvider {
    reply: String,
}

impl StubResponseProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for StubResponseProvider {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_REPLY)
    }
}

#[async_trait]
impl ResponseProvider for StubResponseProvider {
    async fn respond(
        &self,
        user_text: &str,
        _sent_at: DateTime<Utc>,
    ) -> Result<String, ProviderError> {
        tracing::debug!("Stub provider answering {} chars", user_text.chars().count());
        Ok(self.reply.clone())
    }
}
