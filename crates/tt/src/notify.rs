//! HTTP client for ntfy-style notification servers.
//!
//! A message is published by POSTing its text body to `<server>/<topic>`.

use std::fmt;

use thiserror::Error;
use tracing::debug;

/// Header carrying the notification title.
const TITLE_HEADER: &str = "Title";

/// Errors that can occur while publishing a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request could not be sent.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server rejected the message.
    #[error("HTTP error {status}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body, or the canonical reason when empty.
        message: String,
    },
}

/// Result type for notification operations.
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// Publishes messages to one topic on a notification server.
#[derive(Clone)]
pub struct NotifyClient {
    http_client: reqwest::Client,
    server: String,
    topic: String,
}

impl NotifyClient {
    /// Creates a client for `topic` on `server`.
    pub fn new(server: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            server: server.into(),
            topic: topic.into(),
        }
    }

    /// Returns the URL messages are posted to.
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.server.trim_end_matches('/'),
            self.topic.trim_start_matches('/')
        )
    }

    /// Publishes `body` with the given title.
    pub async fn publish(&self, title: &str, body: &str) -> NotifyResult<()> {
        let url = self.url();
        debug!(%url, bytes = body.len(), "publishing notification");

        let response = self
            .http_client
            .post(&url)
            .header(TITLE_HEADER, title)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(NotifyError::Http {
            status: status.as_u16(),
            message: if message.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                message.trim().to_string()
            },
        })
    }
}

impl fmt::Debug for NotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyClient")
            .field("server", &self.server)
            .field("topic", &"[REDACTED]")
            .finish()
    }
}
