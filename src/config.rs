//! Environment-driven configuration

use std::path::PathBuf;
use std::time::Duration;

/// Base URL used when `ASKME_ENDPOINT` is unset
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Request timeout used when `ASKME_REQUEST_TIMEOUT_SECS` is unset or invalid
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL; requests go to `{endpoint}/api/chat`
    pub endpoint: String,
    /// Database file holding the persisted history
    pub db_path: PathBuf,
    /// File receiving JSON logs (the terminal belongs to the UI)
    pub log_path: PathBuf,
    pub request_timeout: Duration,
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = {
            let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
            PathBuf::from(home).join(".askme")
        };

        let request_timeout = lookup("ASKME_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);

        Self {
            endpoint: lookup("ASKME_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            db_path: lookup("ASKME_DB_PATH").map_or_else(|| data_dir.join("askme.db"), PathBuf::from),
            log_path: lookup("ASKME_LOG_PATH").map_or_else(|| data_dir.join("askme.log"), PathBuf::from),
            request_timeout,
        }
    }

    /// Create parent directories for the database and log files
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for path in [&self.db_path, &self.log_path] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
