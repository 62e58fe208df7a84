//! Events that can occur in a conversation

use crate::message::Message;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// User submitted text; the message is already stamped with id and time
    UserMessage { message: Message },

    /// Endpoint answered
    ReplyReceived { message: Message },

    /// Request failed; `message` is the fallback shown in its place
    ReplyFailed { message: Message, error: String },
}
