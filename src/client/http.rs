//! HTTP implementation of the chat client

use super::{ChatClient, ChatError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path of the chat endpoint relative to the configured base URL
pub const CHAT_PATH: &str = "/api/chat";

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    response: String,
}

/// Posts `{"message": ...}` to `{base}/api/chat` and reads `{"response": ...}`
pub struct HttpChatClient {
    client: Client,
    url: String,
}

impl HttpChatClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn reply(&self, message: &str) -> Result<String, ChatError> {
        tracing::debug!(url = %self.url, "Sending chat request");

        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequestBody { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(ChatError::status(
                status.as_u16(),
                format!("Endpoint returned {status}: {excerpt}"),
            ));
        }

        let body = response.text().await?;
        let parsed: ChatResponseBody = serde_json::from_str(&body)
            .map_err(|e| ChatError::malformed(format!("Invalid response body: {e}")))?;

        Ok(parsed.response)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
