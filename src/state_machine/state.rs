//! Conversation state types

use crate::message::Message;
use crate::quota::MAX_QUERIES_PER_SESSION;

/// In-memory conversation state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatState {
    /// Messages in insertion order
    pub messages: Vec<Message>,
    /// A reply is in flight
    pub is_loading: bool,
    /// Sends accepted this session, mirrored from the quota counter
    pub queries_used: u32,
}

impl ChatState {
    pub fn new(messages: Vec<Message>, queries_used: u32) -> Self {
        Self {
            messages,
            is_loading: false,
            queries_used,
        }
    }

    /// Remaining sends, never below zero
    pub fn queries_left(&self, context: &ChatContext) -> u32 {
        context.max_queries.saturating_sub(self.queries_used)
    }

    pub fn can_send(&self, context: &ChatContext) -> bool {
        self.queries_left(context) > 0 && !self.is_loading
    }
}

/// Immutable conversation configuration
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub max_queries: u32,
}

impl Default for ChatContext {
    fn default() -> Self {
        Self {
            max_queries: MAX_QUERIES_PER_SESSION,
        }
    }
}
