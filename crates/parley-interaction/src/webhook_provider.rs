//! WebhookResponseProvider - forwards each message to an HTTP endpoint.
//!
//! Fits automation tools (n8n, Zapier, Make) and small custom backends: the
//! message is POSTed as JSON and the reply is read from the response body.
//!
//! Request body:
//!
//! ```json
//! { "message": "Hello", "timestamp": "2024-06-10T06:13:20Z", "sessionId": "9b2c..." }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parley_core::config::ProviderConfig;
use parley_core::error::ParleyError;
use parley_core::provider::{ProviderError, ResponseProvider};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Response fields checked for the reply text, in order.
const REPLY_FIELDS: [&str; 5] = ["output", "reply", "response", "message", "text"];

/// Provider that POSTs messages to a webhook URL.
#[derive(Clone)]
pub struct WebhookResponseProvider {
    client: Client,
    url: String,
    auth_token: Option<String>,
    timeout: Option<Duration>,
    session_id: String,
}

#[derive(Serialize)]
struct WebhookRequest<'a> {
    message: &'a str,
    timestamp: DateTime<Utc>,
    #[serde(rename = "sessionId")]
    session_id: &'a str,
}

impl WebhookResponseProvider {
    /// Creates a provider for `url` with a fresh random session id.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            auth_token: None,
            timeout: None,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Builds a provider from the `[provider]` config section.
    ///
    /// Fails when no webhook URL is configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ParleyError> {
        let url = config
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                ParleyError::config("provider.kind = \"webhook\" requires provider.webhook_url")
            })?;

        let mut provider = Self::new(url);
        if let Some(token) = config.auth_token.as_deref().filter(|t| !t.is_empty()) {
            provider = provider.with_auth_token(token);
        }
        if let Some(ms) = config.request_timeout_ms.filter(|ms| *ms > 0) {
            provider = provider.with_timeout(Duration::from_millis(ms));
        }
        Ok(provider)
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Per-request timeout enforced by the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the session id sent with each message.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_request(&self, body: &WebhookRequest<'_>) -> Result<String, ProviderError> {
        let mut request = self.client.post(&self.url).json(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|err| {
            match self.timeout.filter(|_| err.is_timeout()) {
                Some(timeout) => ProviderError::Timeout(timeout),
                None => ProviderError::Transport(format!("Webhook request failed: {err}")),
            }
        })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|err| {
            ProviderError::InvalidResponse(format!("Failed to read webhook response: {err}"))
        })?;

        if !status.is_success() {
            return Err(map_http_error(status, body_text));
        }

        Ok(extract_reply(&body_text))
    }
}

#[async_trait]
impl ResponseProvider for WebhookResponseProvider {
    async fn respond(
        &self,
        user_text: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<String, ProviderError> {
        let body = WebhookRequest {
            message: user_text,
            timestamp: sent_at,
            session_id: &self.session_id,
        };

        tracing::debug!(url = %self.url, "Forwarding message to webhook");
        let reply = self.send_request(&body).await?;
        tracing::debug!("Webhook replied with {} chars", reply.chars().count());
        Ok(reply)
    }
}

/// Pulls the reply text out of a webhook response body.
///
/// - JSON object: first string among `output`, `reply`, `response`,
///   `message`, `text`
/// - JSON array: the same lookup on its first element
/// - JSON string: the string itself
/// - Not JSON: the body verbatim
///
/// Anything else yields an empty reply.
pub fn extract_reply(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => reply_from_value(&value).unwrap_or_default(),
        Err(_) => body.to_string(),
    }
}

fn reply_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => items.first().and_then(reply_from_value),
        Value::Object(map) => REPLY_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

fn map_http_error(status: StatusCode, body: String) -> ProviderError {
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(|v| v.as_str().map(str::to_string).or_else(|| Some(v.to_string())))
        })
        .unwrap_or(body);

    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    } else {
        message
    };

    ProviderError::Http {
        status: status.as_u16(),
        message,
    }
}
