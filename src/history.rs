//! Persisted chat history
//!
//! Keeps a rolling window of the most recent messages in durable storage.
//! Every failure here is absorbed: a broken store means an empty history,
//! never an error for the caller.

use crate::message::Message;
use crate::storage::KeyValueStore;
use std::collections::HashSet;
use std::sync::Arc;

/// Durable storage key for the serialized history
pub const HISTORY_KEY: &str = "askme-chat-history";

/// Number of messages kept across restarts
pub const HISTORY_LIMIT: usize = 3;

pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Restore the saved messages in their original order.
    ///
    /// Missing or unreadable data yields an empty list. Duplicate ids keep
    /// their first occurrence, and at most `HISTORY_LIMIT` of the newest
    /// entries are returned.
    pub fn load(&self) -> Vec<Message> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read chat history");
                return Vec::new();
            }
        };

        let parsed: Vec<Message> = match serde_json::from_str(&raw) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable chat history");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut messages: Vec<Message> = parsed
            .into_iter()
            .filter(|m| seen.insert(m.id.clone()))
            .collect();

        let excess = messages.len().saturating_sub(HISTORY_LIMIT);
        messages.drain(..excess);

        tracing::debug!(count = messages.len(), "Loaded chat history");
        messages
    }

    /// Write the last `HISTORY_LIMIT` messages, replacing what was stored.
    /// Best effort: failures are logged and dropped.
    pub fn save(&self, messages: &[Message]) {
        let start = messages.len().saturating_sub(HISTORY_LIMIT);
        let json = match serde_json::to_string(&messages[start..]) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize chat history");
                return;
            }
        };

        if let Err(e) = self.store.set(HISTORY_KEY, &json) {
            tracing::warn!(error = %e, "Failed to persist chat history");
        }
    }
}
