//! Runtime for executing the conversation
//!
//! Owns the chat state, applies state machine transitions and executes
//! their effects against storage, the quota counter and the chat client.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::{ChatHandle, ChatRuntime};

use crate::message::Message;
use crate::state_machine::Notice;

/// Commands sent from the surface to the runtime
#[derive(Debug, Clone)]
pub enum Command {
    Send(String),
}

/// Updates broadcast to observers
#[derive(Debug, Clone)]
pub enum ChatUpdate {
    State(ChatView),
    Notice(Notice),
}

/// Read-only snapshot of the conversation for display
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatView {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub queries_left: u32,
    pub can_send: bool,
}
