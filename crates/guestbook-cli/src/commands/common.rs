//! Shared plumbing for command handlers

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use guestbook_core::GuestbookConfig;
use guestbook_effects::{FilesystemStorageHandler, GuestbookClient, GuestbookHost, RealTimeHandler};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Client type used by every command
pub type LocalClient = GuestbookClient<GuestbookHost, RealTimeHandler>;

/// Load configuration: file, then environment, then the `--data-dir` override
pub fn load_config(path: &Path, data_dir: Option<PathBuf>) -> Result<GuestbookConfig> {
    let mut config = GuestbookConfig::load_from_file(path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    config
        .merge_with_env()
        .context("applying environment overrides")?;
    if let Some(dir) = data_dir {
        config.storage.data_dir = dir;
    }
    config.validate().context("invalid configuration")?;

    debug!(data_dir = %config.storage.data_dir.display(), "configuration loaded");
    Ok(config)
}

/// Open the ledger stored under the configured data directory
pub async fn open_host(config: &GuestbookConfig) -> Result<GuestbookHost> {
    let storage = FilesystemStorageHandler::new(config.storage.data_dir.clone()).with_context(|| {
        format!(
            "opening data directory {}",
            config.storage.data_dir.display()
        )
    })?;

    GuestbookHost::open(config, RealTimeHandler, storage)
        .await
        .context("opening guestbook ledger")
}

/// Open the ledger and wrap it in a retrying client
pub async fn open_client(config: &GuestbookConfig) -> Result<LocalClient> {
    let host = open_host(config).await?;
    Ok(GuestbookClient::new(
        host,
        RealTimeHandler,
        config.client.clone(),
    ))
}

/// Stop the host behind a client, flushing queued writes
pub async fn close_client(client: LocalClient) -> Result<()> {
    client
        .into_service()
        .shutdown()
        .await
        .context("shutting down guestbook host")
}

/// Render seconds since the epoch as a UTC date and time
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{secs}s"))
}
