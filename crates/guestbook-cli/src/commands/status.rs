//! Status command

use crate::commands::common;
use anyhow::Result;
use guestbook_core::GuestbookConfig;
use std::io::Write;

/// Print where the ledger lives and what it holds
pub async fn handle_status(config: &GuestbookConfig, out: &mut impl Write) -> Result<()> {
    let host = common::open_host(config).await?;

    writeln!(out, "Data directory: {}", config.storage.data_dir.display())?;
    writeln!(out, "Ledger key:     {}", config.storage.ledger_key)?;
    writeln!(out, "Signatures:     {}", host.total_signatures().await)?;
    match host.newest().await {
        Some(entry) => writeln!(
            out,
            "Last signed:    {} by {}",
            common::format_timestamp(entry.timestamp()),
            entry.signer()
        )?,
        None => writeln!(out, "Last signed:    never")?,
    }
    if let Some(limit) = config.ledger.max_message_bytes {
        writeln!(out, "Message limit:  {limit} bytes")?;
    }

    host.shutdown().await?;
    Ok(())
}
