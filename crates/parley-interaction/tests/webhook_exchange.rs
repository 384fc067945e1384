//! Webhook provider against a throwaway local HTTP server.

use chrono::{TimeZone, Utc};
use parley_core::config::SessionConfig;
use parley_core::history::{HistoryEntry, HistoryManager, HistoryRepository};
use parley_core::session::{ERROR_NOTICE, FALLBACK_REPLY};
use parley_core::{ConnectivityMonitor, ProviderError, ResponseProvider, Session};
use parley_interaction::WebhookResponseProvider;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A request as seen by the fake server.
struct Captured {
    head: String,
    body: String,
}

/// Serves exactly one request with the given status line and body.
async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/webhook/chat", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let (head, request_body) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let head = text[..split].to_string();
                let length = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                let body = &text[split + 4..];
                if body.len() >= length || n == 0 {
                    break (head, body.to_string());
                }
            }
            if n == 0 {
                break (text, String::new());
            }
        };

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(Captured { head, body: request_body });
    });

    (url, rx)
}

#[derive(Default)]
struct NullHistoryRepository {
    saved: Mutex<Vec<HistoryEntry>>,
}

#[async_trait::async_trait]
impl HistoryRepository for NullHistoryRepository {
    async fn load(&self) -> Vec<HistoryEntry> {
        Vec::new()
    }

    async fn save(&self, entries: &[HistoryEntry]) -> parley_core::error::Result<()> {
        *self.saved.lock().unwrap() = entries.to_vec();
        Ok(())
    }
}

fn session_for(provider: WebhookResponseProvider) -> Session {
    let history = HistoryManager::new(Arc::new(NullHistoryRepository::default()));
    Session::new(
        history,
        &ConnectivityMonitor::new(true),
        Arc::new(provider),
        SessionConfig::instant(),
    )
}

#[tokio::test]
async fn test_posts_message_and_reads_reply() {
    let (url, captured) = serve_once("200 OK", r#"{"output":"Hi from the webhook"}"#).await;
    let provider = WebhookResponseProvider::new(url)
        .with_auth_token("s3cret")
        .with_session_id("session-1");
    let sent_at = Utc.with_ymd_and_hms(2024, 6, 10, 6, 13, 20).unwrap();

    let reply = provider.respond("Hello", sent_at).await.unwrap();
    assert_eq!(reply, "Hi from the webhook");

    let request = captured.await.unwrap();
    assert!(request.head.starts_with("POST /webhook/chat"));
    assert!(
        request
            .head
            .to_ascii_lowercase()
            .contains("authorization: bearer s3cret")
    );

    let payload: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(payload["message"], "Hello");
    assert_eq!(payload["sessionId"], "session-1");
    assert_eq!(payload["timestamp"], "2024-06-10T06:13:20Z");
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let (url, _captured) = serve_once("503 Service Unavailable", r#"{"error":"busy"}"#).await;
    let provider = WebhookResponseProvider::new(url);

    let err = provider.respond("Hello", Utc::now()).await.unwrap_err();

    assert_eq!(
        err,
        ProviderError::Http {
            status: 503,
            message: "busy".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let err = WebhookResponseProvider::new(url)
        .with_timeout(Duration::from_secs(5))
        .respond("Hello", Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn test_session_uses_fallback_for_empty_webhook_reply() {
    let (url, _captured) = serve_once("200 OK", r#"{"status":"accepted"}"#).await;
    let session = session_for(WebhookResponseProvider::new(url));

    session.submit("Anything?").await;

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].content, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_session_recovers_from_webhook_failure() {
    let (url, _captured) = serve_once("500 Internal Server Error", "boom").await;
    let session = session_for(WebhookResponseProvider::new(url));

    session.submit("Test").await;

    let transcript = session.transcript();
    assert_eq!(transcript[1].content, ERROR_NOTICE);
    assert!(session.input_enabled());
    assert_eq!(session.history().await[0].message, "Test");
}
