//! Read-only commands: `total` and `last`

use crate::commands::common;
use anyhow::{Context, Result};
use guestbook_core::{Entry, GuestbookConfig};
use std::io::Write;

/// Shown instead of an empty wall
pub const EMPTY_WALL: &str = "Be the first to sign!";

/// Print the number of signatures
pub async fn handle_total(config: &GuestbookConfig, out: &mut impl Write) -> Result<()> {
    let client = common::open_client(config).await?;
    let total = client
        .total_signatures()
        .await
        .context("getTotalSignatures")?;
    writeln!(out, "{total}")?;
    common::close_client(client).await
}

/// Print the newest signatures, newest first
pub async fn handle_last(
    config: &GuestbookConfig,
    count: Option<usize>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let client = common::open_client(config).await?;
    let count = count.unwrap_or(config.client.default_window);
    let entries = client
        .recent_signatures(count)
        .await
        .context("getLastSignatures")?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        render_wall(&entries, out)?;
    }

    common::close_client(client).await
}

/// Human-readable wall, one entry per line
pub fn render_wall(entries: &[Entry], out: &mut impl Write) -> std::io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "{EMPTY_WALL}");
    }

    for entry in entries {
        writeln!(
            out,
            "[{}] {}: {}",
            common::format_timestamp(entry.timestamp()),
            entry.signer(),
            entry.message()
        )?;
    }
    Ok(())
}
