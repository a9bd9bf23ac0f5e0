//! Client access to a guestbook service
//!
//! Every operation is treated as a remote call that may fail transiently. Signing is
//! split into submission and confirmation: a signature only counts once the host
//! confirms it, and a confirmation timeout is a client-side condition that never
//! cancels the submission.
//!
//! Clients can feed themselves `NewSignature` events (see [`GuestbookClient::follow`]).
//! When reads keep failing, the recent window is rebuilt from those events instead.

use crate::errors::ClientError;
use crate::host::{PendingSignature, SignatureReceipt};
use crate::retry::RetryPolicy;
use crate::service::GuestbookService;
use guestbook_core::effects::PhysicalTimeEffects;
use guestbook_core::{
    replay_recent, ClientConfig, Entry, GuestbookError, GuestbookEvent, SignerAddress,
    EMPTY_MESSAGE_REASON,
};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type ObservedEvents = Arc<RwLock<BTreeMap<usize, GuestbookEvent>>>;

/// Client for a [`GuestbookService`]
pub struct GuestbookClient<S, T> {
    service: S,
    time: T,
    config: ClientConfig,
    retry: RetryPolicy,
    observed: ObservedEvents,
}

impl<S, T> GuestbookClient<S, T>
where
    S: GuestbookService,
    T: PhysicalTimeEffects,
{
    /// Create a client; `time` drives retry backoff
    pub fn new(service: S, time: T, config: ClientConfig) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        Self {
            service,
            time,
            config,
            retry,
            observed: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Replace the retry policy derived from configuration
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Give back the wrapped service
    pub fn into_service(self) -> S {
        self.service
    }

    /// Submit a signature without waiting for confirmation.
    ///
    /// Messages that are blank after trimming are refused here before reaching the
    /// service. The ledger itself only refuses the empty string.
    pub async fn submit(
        &self,
        caller: SignerAddress,
        message: impl Into<String>,
    ) -> Result<PendingSignature, ClientError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(GuestbookError::validation(EMPTY_MESSAGE_REASON).into());
        }

        self.with_retry("submit", || self.service.submit(caller, message.clone()))
            .await
    }

    /// Wait for a submission's confirmation, bounded by the configured timeout
    pub async fn wait_for_confirmation(
        &self,
        pending: PendingSignature,
    ) -> Result<SignatureReceipt, ClientError> {
        let submission_id = pending.submission_id();
        let timeout_ms = self.config.confirmation_timeout_ms;

        match tokio::time::timeout(Duration::from_millis(timeout_ms), pending.confirmed()).await {
            Ok(Ok(receipt)) => {
                debug!(%submission_id, index = receipt.index, "signature confirmed");
                Ok(receipt)
            }
            Ok(Err(err)) => Err(err.into()),
            Err(_) => {
                warn!(%submission_id, timeout_ms, "confirmation timed out");
                Err(ClientError::ConfirmationTimeout {
                    submission_id,
                    timeout_ms,
                })
            }
        }
    }

    /// Submit a signature and wait until it is committed
    pub async fn sign(
        &self,
        caller: SignerAddress,
        message: impl Into<String>,
    ) -> Result<SignatureReceipt, ClientError> {
        let pending = self.submit(caller, message).await?;
        self.wait_for_confirmation(pending).await
    }

    /// Current entry count
    pub async fn total_signatures(&self) -> Result<usize, ClientError> {
        self.with_retry("total_signatures", || self.service.total_signatures())
            .await
    }

    /// Up to `count` newest entries, newest first.
    ///
    /// Falls back to replaying observed events if the service stays unavailable.
    pub async fn recent_signatures(&self, count: usize) -> Result<Vec<Entry>, ClientError> {
        match self
            .with_retry("last_signatures", || self.service.last_signatures(count))
            .await
        {
            Err(err @ ClientError::RetryExhausted { .. }) => {
                let observed = self.observed.read().await;
                if observed.is_empty() {
                    return Err(err);
                }
                warn!(
                    error = %err,
                    observed = observed.len(),
                    "ledger read unavailable, rebuilding window from events"
                );
                Ok(replay_recent(observed.values(), count))
            }
            other => other,
        }
    }

    /// Newest entries using the configured default window
    pub async fn wall(&self) -> Result<Vec<Entry>, ClientError> {
        self.recent_signatures(self.config.default_window).await
    }

    /// Record an event for read fallback
    pub async fn observe(&self, event: GuestbookEvent) {
        record(&self.observed, event).await;
    }

    /// Number of distinct events observed so far
    pub async fn observed_count(&self) -> usize {
        self.observed.read().await.len()
    }

    /// Record every event from `receiver` in the background until the sender closes
    pub fn follow(&self, mut receiver: broadcast::Receiver<GuestbookEvent>) -> JoinHandle<()> {
        let observed = Arc::clone(&self.observed);
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => record(&observed, event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn with_retry<R, F, Fut>(&self, operation: &'static str, call: F) -> Result<R, ClientError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = guestbook_core::Result<R>>,
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err.into()),
                Err(err) if attempt >= max_attempts => {
                    return Err(ClientError::RetryExhausted {
                        operation,
                        attempts: attempt,
                        last_error: err,
                    });
                }
                Err(err) => {
                    let delay = self.retry.delay_for(attempt - 1);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after transient failure"
                    );
                    self.time
                        .sleep_ms(delay.as_millis() as u64)
                        .await
                        .map_err(GuestbookError::from)?;
                }
            }
        }
    }
}

async fn record(observed: &ObservedEvents, event: GuestbookEvent) {
    observed.write().await.insert(event.index(), event);
}
