//! Pure state transition function

use super::{ChatContext, ChatState, Effect, Event, Notice};
use thiserror::Error;

/// Reply shown when the endpoint cannot be reached or answers badly
pub const FALLBACK_REPLY: &str =
    "I apologize, but I encountered an error processing your request. Please try again later.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Session quota of {max_queries} messages used up")]
    QuotaExhausted { max_queries: u32 },
    #[error("A reply is still pending")]
    ReplyPending,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Whether the send gate turned the message away
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::QuotaExhausted { .. } | Self::ReplyPending)
    }
}

/// Pure transition function: same inputs, same outputs, no I/O.
pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.is_loading, event) {
        (true, Event::UserMessage { .. }) => Err(TransitionError::ReplyPending),

        (false, Event::UserMessage { message }) => {
            if !state.can_send(context) {
                return Err(TransitionError::QuotaExhausted {
                    max_queries: context.max_queries,
                });
            }
            if !message.is_user {
                return Err(TransitionError::InvalidTransition(
                    "user event carries an assistant message".to_string(),
                ));
            }

            let payload = message.content.clone();
            let mut next = state.clone();
            next.messages.push(message);
            next.is_loading = true;
            next.queries_used = next.queries_used.saturating_add(1);

            Ok(TransitionResult::new(next)
                .with_effect(Effect::PersistHistory)
                .with_effect(Effect::IncrementQuota)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestReply { content: payload }))
        }

        (true, Event::ReplyReceived { message }) => {
            let mut next = state.clone();
            next.messages.push(message);
            next.is_loading = false;

            Ok(TransitionResult::new(next)
                .with_effect(Effect::PersistHistory)
                .with_effect(Effect::PublishState))
        }

        (true, Event::ReplyFailed { message, .. }) => {
            let mut next = state.clone();
            next.messages.push(message);
            next.is_loading = false;

            Ok(TransitionResult::new(next)
                .with_effect(Effect::Notify(Notice::RequestFailed))
                .with_effect(Effect::PersistHistory)
                .with_effect(Effect::PublishState))
        }

        (false, Event::ReplyReceived { .. } | Event::ReplyFailed { .. }) => Err(
            TransitionError::InvalidTransition("reply arrived with no request pending".to_string()),
        ),
    }
}
