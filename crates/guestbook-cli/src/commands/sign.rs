//! Sign command

use crate::commands::common;
use anyhow::{Context, Result};
use guestbook_core::{GuestbookConfig, SignerAddress};
use std::io::Write;
use tracing::info;

/// Sign the guestbook as `signer` and print the receipt once confirmed
pub async fn handle_sign(
    config: &GuestbookConfig,
    signer: SignerAddress,
    message: &str,
    out: &mut impl Write,
) -> Result<()> {
    let client = common::open_client(config).await?;

    let pending = client.submit(signer, message).await.context("signBook")?;
    let submission_id = pending.submission_id();
    info!(%submission_id, %signer, "signature submitted");

    let receipt = client
        .wait_for_confirmation(pending)
        .await
        .context("waiting for confirmation")?;
    writeln!(
        out,
        "Signed as {} (#{}, {})",
        receipt.entry.signer(),
        receipt.index,
        common::format_timestamp(receipt.entry.timestamp())
    )?;

    common::close_client(client).await
}
