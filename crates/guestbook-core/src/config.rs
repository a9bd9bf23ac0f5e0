//! Guestbook configuration
//!
//! Loaded from an optional TOML file, then overridden by `GUESTBOOK_*` environment
//! variables, then validated. Every field has a default so an absent file is valid.

use crate::errors::{GuestbookError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "GUESTBOOK_";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestbookConfig {
    /// Where the ledger snapshot lives
    pub storage: StorageConfig,
    /// Ledger policy
    pub ledger: LedgerConfig,
    /// Host runtime sizing
    pub host: HostConfig,
    /// Client behaviour
    pub client: ClientConfig,
}

/// Storage location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the snapshot file
    pub data_dir: PathBuf,
    /// Storage key of the snapshot
    pub ledger_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".guestbook"),
            ledger_key: "guestbook_ledger".to_string(),
        }
    }
}

/// Ledger policy. Messages are unbounded unless `max_message_bytes` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Optional upper bound on message length in bytes
    pub max_message_bytes: Option<usize>,
}

/// Host runtime sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Pending mutations buffered before `submit` waits
    pub queue_capacity: usize,
    /// Events buffered per subscriber before it lags
    pub event_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            event_capacity: 256,
        }
    }
}

/// Client behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Window size used when a caller does not pick one
    pub default_window: usize,
    /// How long `sign` waits for confirmation
    pub confirmation_timeout_ms: u64,
    /// Retry policy for transient failures
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_window: 20,
            confirmation_timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

/// Backoff strategy for retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed,
    /// Linear increase: delay * attempt
    Linear,
    /// Exponential increase: delay * 2^attempt
    Exponential,
    /// Exponential with up to 10% jitter
    ExponentialWithJitter,
}

/// Retry policy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay
    pub max_delay_ms: u64,
    /// How delays grow
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 2_000,
            backoff: BackoffStrategy::Exponential,
        }
    }
}

impl GuestbookConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GuestbookError::config(format!("invalid TOML: {e}")))
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            GuestbookError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `GUESTBOOK_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn merge_with_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        if let Some(dir) = var("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = var("LEDGER_KEY") {
            self.storage.ledger_key = key;
        }
        if let Some(window) = var("DEFAULT_WINDOW") {
            self.client.default_window = window.parse().map_err(|_| {
                GuestbookError::config(format!("GUESTBOOK_DEFAULT_WINDOW is not a number: {window}"))
            })?;
        }
        Ok(())
    }

    /// Validate field ranges
    pub fn validate(&self) -> Result<()> {
        if self.storage.ledger_key.is_empty() {
            return Err(GuestbookError::config("storage.ledger_key cannot be empty"));
        }
        if self.ledger.max_message_bytes == Some(0) {
            return Err(GuestbookError::config(
                "ledger.max_message_bytes must be positive when set",
            ));
        }
        if self.host.queue_capacity == 0 {
            return Err(GuestbookError::config("host.queue_capacity must be positive"));
        }
        if self.host.event_capacity == 0 {
            return Err(GuestbookError::config("host.event_capacity must be positive"));
        }
        if self.client.retry.max_attempts == 0 {
            return Err(GuestbookError::config(
                "client.retry.max_attempts must be at least 1",
            ));
        }
        if self.client.retry.initial_delay_ms > self.client.retry.max_delay_ms {
            return Err(GuestbookError::config(
                "client.retry.initial_delay_ms exceeds max_delay_ms",
            ));
        }
        Ok(())
    }
}
