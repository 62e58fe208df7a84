//! Mock implementations for testing
//!
//! These mocks enable end-to-end runtime tests without real I/O.

use super::{ChatRuntime, ChatUpdate};
use crate::client::{ChatClient, ChatError};
use crate::history::HistoryStore;
use crate::quota::QuotaCounter;
use crate::state_machine::{ChatContext, Notice};
use crate::storage::{KeyValueStore, MemoryStore, SqliteStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

// ============================================================================
// Mock Chat Clients
// ============================================================================

/// Mock chat client that returns queued replies
pub struct MockChatClient {
    replies: Mutex<VecDeque<Result<String, ChatError>>>,
    /// Record of all messages sent
    requests: Mutex<Vec<String>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: ChatError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded request payloads
    pub fn recorded_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn reply(&self, message: &str) -> Result<String, ChatError> {
        self.requests.lock().unwrap().push(message.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::network("No mock reply queued")))
    }

    fn endpoint(&self) -> &'static str {
        "mock://chat"
    }
}

/// Chat client whose requests never complete
pub struct HangingChatClient;

#[async_trait]
impl ChatClient for HangingChatClient {
    async fn reply(&self, _message: &str) -> Result<String, ChatError> {
        std::future::pending().await
    }

    fn endpoint(&self) -> &'static str {
        "mock://hanging"
    }
}

// ============================================================================
// Test Runtime Builder
// ============================================================================

/// Stores shared between a runtime and the test inspecting it
pub struct TestStores {
    pub durable: Arc<dyn KeyValueStore>,
    pub session: Arc<dyn KeyValueStore>,
}

impl TestStores {
    pub fn new() -> Self {
        Self {
            durable: Arc::new(SqliteStore::open_in_memory().unwrap()),
            session: Arc::new(MemoryStore::new()),
        }
    }

    pub fn runtime<C: ChatClient + 'static>(&self, client: C) -> ChatRuntime<C> {
        ChatRuntime::new(
            ChatContext::default(),
            HistoryStore::new(Arc::clone(&self.durable)),
            QuotaCounter::new(Arc::clone(&self.session)),
            client,
        )
    }

    pub fn history(&self) -> HistoryStore {
        HistoryStore::new(Arc::clone(&self.durable))
    }

    pub fn quota(&self) -> QuotaCounter {
        QuotaCounter::new(Arc::clone(&self.session))
    }
}

/// Drain every update already broadcast and return the notices among them
pub fn drain_notices(rx: &mut broadcast::Receiver<ChatUpdate>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(update) = rx.try_recv() {
        if let ChatUpdate::Notice(notice) = update {
            notices.push(notice);
        }
    }
    notices
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatErrorKind;
    use crate::history::HISTORY_KEY;
    use crate::message::Message;
    use crate::quota::QUOTA_KEY;
    use crate::runtime::{ChatHandle, ChatView};
    use crate::state_machine::FALLBACK_REPLY;
    use std::time::Duration;

    /// Wait for a state update matching `pred`
    async fn wait_for_view(
        handle: &mut ChatHandle,
        pred: impl Fn(&ChatView) -> bool,
        timeout: Duration,
    ) -> Option<ChatView> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), handle.next_update()).await {
                Ok(Some(ChatUpdate::State(view))) if pred(&view) => return Some(view),
                _ => {}
            }
        }
        None
    }

    /// Wait for the next notice, skipping state updates
    async fn wait_for_notice(handle: &mut ChatHandle, timeout: Duration) -> Option<Notice> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), handle.next_update()).await {
                Ok(Some(ChatUpdate::Notice(notice))) => return Some(notice),
                _ => {}
            }
        }
        None
    }

    #[tokio::test]
    async fn test_mock_chat_client() {
        let mock = MockChatClient::new();
        mock.queue_reply("Hello");

        assert_eq!(mock.reply("hi").await.unwrap(), "Hello");

        // Second call should fail (no more replies)
        assert!(mock.reply("again").await.is_err());
        assert_eq!(mock.recorded_requests(), vec!["hi", "again"]);
    }

    #[tokio::test]
    async fn test_fresh_session_scenario() {
        let stores = TestStores::new();
        let client = Arc::new(MockChatClient::new());
        for _ in 0..6 {
            client.queue_reply("hi");
        }
        let mut rt = stores.runtime(client.clone());
        let mut updates = rt.subscribe();

        assert_eq!(rt.view().queries_left, 5);
        rt.send_message("hello").await;

        let view = rt.view();
        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.messages[0].content, "hello");
        assert!(view.messages[0].is_user);
        assert_eq!(view.messages[1].content, "hi");
        assert!(!view.messages[1].is_user);
        assert_eq!(view.queries_left, 4);
        assert!(view.can_send);

        for _ in 0..4 {
            rt.send_message("hello").await;
        }
        let view = rt.view();
        assert_eq!(view.messages.len(), 10);
        assert_eq!(view.queries_left, 0);
        assert!(!view.can_send);
        assert!(drain_notices(&mut updates).is_empty());

        // Sixth attempt is turned away
        rt.send_message("one more").await;
        assert_eq!(rt.view().messages.len(), 10);
        assert_eq!(stores.quota().count(), 5);
        assert_eq!(
            drain_notices(&mut updates),
            vec![Notice::RateLimited { max_queries: 5 }]
        );
        assert_eq!(client.recorded_requests().len(), 5);
    }

    #[tokio::test]
    async fn test_persisted_history_tracks_last_three() {
        let stores = TestStores::new();
        let client = Arc::new(MockChatClient::new());
        client.queue_reply("first answer");
        client.queue_reply("second answer");
        let mut rt = stores.runtime(client);

        rt.send_message("first question").await;
        assert_eq!(stores.history().load(), rt.view().messages);

        rt.send_message("second question").await;
        let messages = rt.view().messages;
        assert_eq!(messages.len(), 4);
        assert_eq!(stores.history().load(), messages[1..].to_vec());
    }

    #[tokio::test]
    async fn test_network_failure_appends_fallback() {
        let stores = TestStores::new();
        let client = Arc::new(MockChatClient::new());
        client.queue_error(ChatError::status(502, "bad gateway"));
        let mut rt = stores.runtime(client);
        let mut updates = rt.subscribe();

        rt.send_message("hello").await;

        let view = rt.view();
        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.messages[1].content, FALLBACK_REPLY);
        assert!(!view.messages[1].is_user);
        assert!(!view.is_loading);
        assert_eq!(view.queries_left, 4);
        // The failed attempt still counts
        assert_eq!(stores.quota().count(), 1);
        assert_eq!(drain_notices(&mut updates), vec![Notice::RequestFailed]);
        assert_eq!(stores.history().load(), view.messages);
    }

    #[tokio::test]
    async fn test_failure_kinds_all_recover() {
        let stores = TestStores::new();
        let client = Arc::new(MockChatClient::new());
        client.queue_error(ChatError::network("refused"));
        client.queue_error(ChatError::timeout("slow"));
        client.queue_error(ChatError::malformed("no response field"));
        let mut rt = stores.runtime(client);

        for _ in 0..3 {
            rt.send_message("hello").await;
        }

        let view = rt.view();
        assert_eq!(view.messages.len(), 6);
        assert!(view
            .messages
            .iter()
            .filter(|m| !m.is_user)
            .all(|m| m.content == FALLBACK_REPLY));
        assert_eq!(view.queries_left, 2);
        assert_eq!(ChatError::timeout("x").kind, ChatErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_reload_restores_most_recent_three() {
        let stores = TestStores::new();
        let prior: Vec<Message> = vec![
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
            Message::assistant("a2"),
        ];
        stores.history().save(&prior);

        let rt = stores.runtime(MockChatClient::new());
        let view = rt.view();

        assert_eq!(view.messages, prior[1..].to_vec());
        for (restored, original) in view.messages.iter().zip(&prior[1..]) {
            assert_eq!(restored.timestamp, original.timestamp);
        }
    }

    #[tokio::test]
    async fn test_malformed_history_starts_empty() {
        let stores = TestStores::new();
        stores.durable.set(HISTORY_KEY, "[{oops").unwrap();

        let rt = stores.runtime(MockChatClient::new());
        assert!(rt.view().messages.is_empty());
        assert!(rt.view().can_send);
    }

    #[tokio::test]
    async fn test_exhausted_session_rejects_without_side_effects() {
        let stores = TestStores::new();
        stores.session.set(QUOTA_KEY, "5").unwrap();
        let client = Arc::new(MockChatClient::new());
        let mut rt = stores.runtime(client.clone());
        let mut updates = rt.subscribe();

        rt.send_message("hello").await;

        assert!(rt.view().messages.is_empty());
        assert_eq!(stores.quota().count(), 5);
        assert_eq!(stores.durable.get(HISTORY_KEY).unwrap(), None);
        assert!(client.recorded_requests().is_empty());
        assert_eq!(
            drain_notices(&mut updates),
            vec![Notice::RateLimited { max_queries: 5 }]
        );
    }

    #[tokio::test]
    async fn test_session_reset_restores_quota() {
        let stores = TestStores::new();
        let client = Arc::new(MockChatClient::new());
        for _ in 0..6 {
            client.queue_reply("ok");
        }
        let mut rt = stores.runtime(client);

        for _ in 0..5 {
            rt.send_message("hello").await;
        }
        assert!(!rt.view().can_send);

        // A new session starts with a cleared session store
        stores.session.clear().unwrap();
        rt.send_message("new session").await;

        let view = rt.view();
        assert_eq!(view.messages.len(), 12);
        assert_eq!(view.queries_left, 4);
    }

    #[tokio::test]
    async fn test_broken_durable_store_is_absorbed() {
        let stores = TestStores {
            durable: Arc::new(MemoryStore::with_byte_limit(4)),
            session: Arc::new(MemoryStore::new()),
        };
        let client = Arc::new(MockChatClient::new());
        client.queue_reply("still works");
        let mut rt = stores.runtime(client);

        rt.send_message("hello").await;

        assert_eq!(rt.view().messages.len(), 2);
        assert!(stores.history().load().is_empty());
    }

    #[tokio::test]
    async fn test_background_runtime_publishes_updates() {
        let stores = TestStores::new();
        let client = Arc::new(MockChatClient::new());
        client.queue_reply("hi");
        let mut handle = stores.runtime(client).start();

        let initial = wait_for_view(&mut handle, |_| true, Duration::from_secs(1))
            .await
            .expect("initial state");
        assert!(initial.messages.is_empty());
        assert_eq!(initial.queries_left, 5);

        assert!(handle.send("hello"));

        let done = wait_for_view(
            &mut handle,
            |v| v.messages.len() == 2 && !v.is_loading,
            Duration::from_secs(2),
        )
        .await
        .expect("reply should land");
        assert_eq!(done.messages[1].content, "hi");
        assert_eq!(done.queries_left, 4);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_send_while_pending_is_rejected() {
        let stores = TestStores::new();
        let mut handle = stores.runtime(HangingChatClient).start();

        assert!(handle.send("first"));
        let loading = wait_for_view(&mut handle, |v| v.is_loading, Duration::from_secs(1))
            .await
            .expect("loading state");
        assert!(!loading.can_send);
        assert_eq!(loading.messages.len(), 1);

        assert!(handle.send("second"));
        let notice = wait_for_notice(&mut handle, Duration::from_secs(1)).await;
        assert_eq!(notice, Some(Notice::RateLimited { max_queries: 5 }));

        // Only the first send was counted or stored
        assert_eq!(stores.quota().count(), 1);
        assert_eq!(stores.history().load().len(), 1);

        handle.shutdown().await;
    }
}
