//! Askme, a terminal chat client
//!
//! Sends user questions to a remote `/api/chat` endpoint, keeps a short
//! rolling history on disk and caps sends per session.

mod client;
mod config;
mod history;
mod message;
mod quota;
mod runtime;
mod state_machine;
mod storage;
mod ui;

use client::{HttpChatClient, LoggingClient};
use config::ChatConfig;
use history::HistoryStore;
use quota::QuotaCounter;
use runtime::ChatRuntime;
use state_machine::ChatContext;
use std::sync::Arc;
use storage::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::App;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChatConfig::from_env();
    config.ensure_dirs()?;

    // Logs go to a file; the terminal belongs to the UI
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askme=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::sync::Mutex::new(log_file)),
        )
        .init();

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let durable = storage::open_durable(&config.db_path);
    let session = Arc::new(MemoryStore::new());

    let client = LoggingClient::new(HttpChatClient::new(&config.endpoint, config.request_timeout)?);
    tracing::info!(
        endpoint = %config.endpoint,
        timeout_secs = config.request_timeout.as_secs(),
        "Chat client ready"
    );

    let runtime = ChatRuntime::new(
        ChatContext::default(),
        HistoryStore::new(durable),
        QuotaCounter::new(session),
        client,
    );
    let handle = runtime.start();

    let mut terminal = ratatui::try_init()?;
    let (app, result) = tokio::task::spawn_blocking(move || {
        let mut app = App::new(handle);
        let result = app.run(&mut terminal);
        ratatui::restore();
        (app, result)
    })
    .await?;

    app.into_handle().shutdown().await;
    result?;

    tracing::info!("Session ended");
    Ok(())
}
