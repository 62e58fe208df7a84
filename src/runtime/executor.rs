//! Conversation runtime executor

use super::{ChatUpdate, ChatView, Command};
use crate::client::ChatClient;
use crate::history::HistoryStore;
use crate::message::Message;
use crate::quota::QuotaCounter;
use crate::state_machine::{
    transition, ChatContext, ChatState, Effect, Event, Notice, FALLBACK_REPLY,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Conversation runtime, generic over the chat endpoint
pub struct ChatRuntime<C: ChatClient + 'static> {
    context: ChatContext,
    state: ChatState,
    history: HistoryStore,
    quota: QuotaCounter,
    client: Arc<C>,
    /// Completed requests report back here
    reply_tx: mpsc::Sender<Event>,
    reply_rx: mpsc::Receiver<Event>,
    updates_tx: broadcast::Sender<ChatUpdate>,
}

impl<C: ChatClient + 'static> ChatRuntime<C> {
    /// Build the runtime, restoring history and the session count
    pub fn new(context: ChatContext, history: HistoryStore, quota: QuotaCounter, client: C) -> Self {
        let messages = history.load();
        let queries_used = quota.count();
        tracing::info!(
            restored = messages.len(),
            queries_used,
            endpoint = %client.endpoint(),
            "Chat runtime initialized"
        );

        let (reply_tx, reply_rx) = mpsc::channel(8);
        let (updates_tx, _) = broadcast::channel(64);

        Self {
            context,
            state: ChatState::new(messages, queries_used),
            history,
            quota,
            client: Arc::new(client),
            reply_tx,
            reply_rx,
            updates_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatUpdate> {
        self.updates_tx.subscribe()
    }

    /// Current state as seen by the surface
    pub fn view(&self) -> ChatView {
        ChatView {
            messages: self.state.messages.clone(),
            is_loading: self.state.is_loading,
            queries_left: self.state.queries_left(&self.context),
            can_send: self.state.can_send(&self.context),
        }
    }

    /// Send one message and wait until its reply (or the fallback) has
    /// been appended. Never fails: rejections and request failures turn
    /// into notices.
    #[allow(dead_code)] // The surface drives the runtime through `start`
    pub async fn send_message(&mut self, content: &str) {
        self.submit(content);
        if self.state.is_loading {
            if let Some(event) = self.reply_rx.recv().await {
                self.process_event(event);
            }
        }
    }

    /// Run as a background task driven by `Command`s
    pub fn start(self) -> ChatHandle {
        let (commands_tx, commands_rx) = mpsc::channel(16);
        let updates = self.subscribe();
        let task = tokio::spawn(self.run(commands_rx));
        ChatHandle {
            commands: commands_tx,
            updates,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::info!("Starting chat runtime");
        self.publish_state();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Send(text)) => self.submit(&text),
                    None => break,
                },
                Some(event) = self.reply_rx.recv() => self.process_event(event),
            }
        }

        tracing::info!("Chat runtime stopped");
    }

    fn submit(&mut self, content: &str) {
        // The session store is the source of truth for the count
        self.state.queries_used = self.quota.count();
        self.process_event(Event::UserMessage {
            message: Message::user(content),
        });
    }

    fn process_event(&mut self, event: Event) {
        if let Event::ReplyFailed { error, .. } = &event {
            tracing::debug!(error = %error, "Replacing failed reply with fallback");
        }

        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) if e.is_rejection() => {
                tracing::info!(reason = %e, "Message rejected");
                self.notify(Notice::RateLimited {
                    max_queries: self.context.max_queries,
                });
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring event");
                return;
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::PersistHistory => self.history.save(&self.state.messages),
            Effect::IncrementQuota => self.quota.increment(),
            Effect::RequestReply { content } => self.spawn_request(content),
            Effect::Notify(notice) => self.notify(notice),
            Effect::PublishState => self.publish_state(),
        }
    }

    fn spawn_request(&self, content: String) {
        let client = Arc::clone(&self.client);
        let reply_tx = self.reply_tx.clone();

        tokio::spawn(async move {
            let event = match client.reply(&content).await {
                Ok(reply) => Event::ReplyReceived {
                    message: Message::assistant(reply),
                },
                Err(e) => Event::ReplyFailed {
                    message: Message::assistant(FALLBACK_REPLY),
                    error: e.to_string(),
                },
            };
            if reply_tx.send(event).await.is_err() {
                tracing::debug!("Runtime gone before reply arrived");
            }
        });
    }

    fn notify(&self, notice: Notice) {
        tracing::info!(notice = %notice, "Notice");
        let _ = self.updates_tx.send(ChatUpdate::Notice(notice));
    }

    fn publish_state(&self) {
        let _ = self.updates_tx.send(ChatUpdate::State(self.view()));
    }
}

/// Handle to a runtime running in the background
pub struct ChatHandle {
    commands: mpsc::Sender<Command>,
    updates: broadcast::Receiver<ChatUpdate>,
    task: JoinHandle<()>,
}

impl ChatHandle {
    /// Queue a message for sending. Returns false if the runtime is gone
    /// or its queue is full.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.commands.try_send(Command::Send(text.into())).is_ok()
    }

    /// Next pending update, if any, without waiting
    pub fn try_update(&mut self) -> Option<ChatUpdate> {
        loop {
            match self.updates.try_recv() {
                Ok(update) => return Some(update),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Surface fell behind on updates");
                }
                Err(_) => return None,
            }
        }
    }

    /// Wait for the next update
    #[allow(dead_code)] // Used in tests
    pub async fn next_update(&mut self) -> Option<ChatUpdate> {
        loop {
            match self.updates.recv().await {
                Ok(update) => return Some(update),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Handle whose runtime has already stopped
    #[cfg(test)]
    pub fn detached() -> Self {
        let (commands, _) = mpsc::channel(1);
        let (_, updates) = broadcast::channel(1);
        Self {
            commands,
            updates,
            task: tokio::spawn(async {}),
        }
    }

    /// Close the command channel and wait for the runtime to stop
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Chat runtime task failed");
        }
    }
}
