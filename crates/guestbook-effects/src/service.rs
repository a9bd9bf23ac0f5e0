//! Service seam between clients and the authoritative ledger
//!
//! Clients depend on this trait rather than on [`GuestbookHost`] directly so the same
//! client code can talk to an in-process host or any remote transport. A transport
//! answers `submit` with [`PendingSignature::new`] over the receiving half of a
//! `tokio::sync::oneshot` channel and resolves it when the remote side confirms.

use crate::host::{GuestbookHost, PendingSignature};
use async_trait::async_trait;
use guestbook_core::{Entry, Result, SignerAddress};

/// The three ledger operations as remote, possibly failing calls
#[async_trait]
pub trait GuestbookService: Send + Sync {
    /// Submit a signature; resolves once the host has accepted it
    async fn submit(&self, caller: SignerAddress, message: String) -> Result<PendingSignature>;

    /// Current entry count
    async fn total_signatures(&self) -> Result<usize>;

    /// Up to `count` newest entries, newest first
    async fn last_signatures(&self, count: usize) -> Result<Vec<Entry>>;
}

#[async_trait]
impl GuestbookService for GuestbookHost {
    async fn submit(&self, caller: SignerAddress, message: String) -> Result<PendingSignature> {
        GuestbookHost::submit(self, caller, message).await
    }

    async fn total_signatures(&self) -> Result<usize> {
        Ok(GuestbookHost::total_signatures(self).await)
    }

    async fn last_signatures(&self, count: usize) -> Result<Vec<Entry>> {
        Ok(GuestbookHost::last_signatures(self, count).await)
    }
}

/// Blanket implementation for Arc<T> where T: GuestbookService
#[async_trait]
impl<T: GuestbookService + ?Sized> GuestbookService for std::sync::Arc<T> {
    async fn submit(&self, caller: SignerAddress, message: String) -> Result<PendingSignature> {
        (**self).submit(caller, message).await
    }

    async fn total_signatures(&self) -> Result<usize> {
        (**self).total_signatures().await
    }

    async fn last_signatures(&self, count: usize) -> Result<Vec<Entry>> {
        (**self).last_signatures(count).await
    }
}
