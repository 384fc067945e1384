//! Configuration model shared by every Parley crate.
//!
//! Every field carries a serde default so a partial (or empty) `config.toml`
//! deserializes into a usable configuration.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of history entries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
/// Default number of characters kept in a history preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 50;
/// Default reply returned by the placeholder provider.
pub const DEFAULT_PLACEHOLDER_REPLY: &str =
    "Thanks for your message! A real response provider is not connected yet.";

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RootConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Bounds of the artificial "typing" delay, in milliseconds.
///
/// The delay is drawn uniformly from `[min_delay_ms, max_delay_ms)`. When the
/// range is empty (`max <= min`) the delay is exactly `min_delay_ms`, so
/// `{0, 0}` disables it entirely.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingDelay {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl TypingDelay {
    pub const fn new(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms,
            max_delay_ms,
        }
    }

    /// No delay at all.
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Draws one delay from the configured range.
    pub fn sample(&self) -> Duration {
        if self.max_delay_ms <= self.min_delay_ms {
            return Duration::from_millis(self.min_delay_ms);
        }
        let millis = rand::thread_rng().gen_range(self.min_delay_ms..self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

impl Default for TypingDelay {
    fn default() -> Self {
        Self::new(default_min_delay_ms(), default_max_delay_ms())
    }
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2000
}

/// Session state machine settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SessionConfig {
    #[serde(default)]
    pub typing_delay: TypingDelay,
    /// Upper bound on a single provider call. `None` or `0` waits indefinitely.
    #[serde(
        default = "default_provider_timeout_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_timeout_ms: Option<u64>,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Bot message shown as the first transcript entry of a new session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

impl SessionConfig {
    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Settings suited to tests: no typing delay, default bounds.
    pub fn instant() -> Self {
        Self {
            typing_delay: TypingDelay::none(),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            typing_delay: TypingDelay::default(),
            provider_timeout_ms: default_provider_timeout_ms(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            greeting: None,
        }
    }
}

fn default_provider_timeout_ms() -> Option<u64> {
    Some(30_000)
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

/// Which response provider implementation to use.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Stub,
    Webhook,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default = "default_placeholder_reply")]
    pub placeholder_reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Stub,
            webhook_url: None,
            auth_token: None,
            placeholder_reply: default_placeholder_reply(),
            request_timeout_ms: None,
        }
    }
}

fn default_placeholder_reply() -> String {
    DEFAULT_PLACEHOLDER_REPLY.to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StorageConfig {
    /// Overrides the platform data directory for the history store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}
