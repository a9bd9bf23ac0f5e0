//! Init command: deploy an empty ledger

use crate::commands::common;
use anyhow::Result;
use guestbook_core::GuestbookConfig;
use std::io::Write;

/// Deploy the ledger if missing; report the existing count otherwise
pub async fn handle_init(config: &GuestbookConfig, out: &mut impl Write) -> Result<()> {
    let host = common::open_host(config).await?;
    let data_dir = config.storage.data_dir.display();

    if host.was_deployed() {
        writeln!(out, "Deployed empty guestbook in {data_dir}")?;
    } else {
        writeln!(
            out,
            "Guestbook already deployed in {data_dir} with {} signatures",
            host.total_signatures().await
        )?;
    }

    host.shutdown().await?;
    Ok(())
}
