//! Per-session send quota

use crate::storage::KeyValueStore;
use std::sync::Arc;

/// Session storage key holding the decimal send count
pub const QUOTA_KEY: &str = "askme-query-count";

/// Accepted sends allowed per session
pub const MAX_QUERIES_PER_SESSION: u32 = 5;

/// Counts accepted sends in session-scoped storage. The count only resets
/// when the session store itself is cleared.
pub struct QuotaCounter {
    store: Arc<dyn KeyValueStore>,
}

impl QuotaCounter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current count; 0 when absent or unreadable
    pub fn count(&self) -> u32 {
        match self.store.get(QUOTA_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::debug!(value = %raw, "Ignoring unparsable query count");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read query count");
                0
            }
        }
    }

    /// Record one more send. Failures are logged and dropped.
    pub fn increment(&self) {
        let next = self.count().saturating_add(1);
        if let Err(e) = self.store.set(QUOTA_KEY, &next.to_string()) {
            tracing::warn!(error = %e, "Failed to record query count");
        }
    }
}
