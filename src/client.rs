//! Client for the remote chat endpoint
//!
//! The endpoint is an opaque collaborator: one user message in, one reply
//! string out.

mod error;
mod http;

pub use error::{ChatError, ChatErrorKind};
pub use http::HttpChatClient;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for chat endpoints
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one user message and return the reply text
    async fn reply(&self, message: &str) -> Result<String, ChatError>;

    /// Where requests go, for logging
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: ChatClient + ?Sized> ChatClient for Arc<T> {
    async fn reply(&self, message: &str) -> Result<String, ChatError> {
        (**self).reply(message).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for chat clients
pub struct LoggingClient<C> {
    inner: C,
}

impl<C: ChatClient> LoggingClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ChatClient> ChatClient for LoggingClient<C> {
    async fn reply(&self, message: &str) -> Result<String, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.reply(message).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    request_chars = message.chars().count(),
                    reply_chars = reply.chars().count(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    transient = matches!(e.kind, ChatErrorKind::Network | ChatErrorKind::Timeout),
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
