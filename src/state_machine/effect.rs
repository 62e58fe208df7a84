//! Effects produced by state transitions

use std::fmt;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the tail of the message list to durable storage
    PersistHistory,

    /// Count one accepted send against the session quota
    IncrementQuota,

    /// Send the user's text to the chat endpoint
    RequestReply { content: String },

    /// Show a transient notice to the user
    Notify(Notice),

    /// Publish the new state to observers
    PublishState,
}

/// Transient user-facing notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    RateLimited { max_queries: u32 },
    RequestFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RateLimited { max_queries } => write!(
                f,
                "Rate limit reached. You can send up to {max_queries} messages per session."
            ),
            Notice::RequestFailed => {
                f.write_str("Sorry, I encountered an error. Please try again.")
            }
        }
    }
}
