//! Key-value storage for chat history and the session quota
//!
//! Both stores hold string values under string keys. The durable store
//! survives restarts; the session store lives as long as the process.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },
    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String-valued key-value store scoped to one owner
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any prior value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove every key in this store's scope
    #[allow(dead_code)] // Session reset, exercised by tests
    fn clear(&self) -> StorageResult<()>;
}

/// Open the durable store at `path`. A missing directory, unreadable or
/// corrupt file falls back to an in-memory store, so history is kept for
/// this run only instead of failing startup.
pub fn open_durable(path: &Path) -> Arc<dyn KeyValueStore> {
    match SqliteStore::open(path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Durable store unavailable, history will not survive restart"
            );
            Arc::new(MemoryStore::new())
        }
    }
}
