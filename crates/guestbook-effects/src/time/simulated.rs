//! Controllable time source for deterministic testing
//!
//! Sleeping advances the simulated clock instead of waiting, so retry backoff
//! completes instantly and the total slept time can be asserted.

use async_trait::async_trait;
use guestbook_core::effects::{PhysicalTimeEffects, TimeError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Simulated clock with millisecond resolution
#[derive(Debug, Clone, Default)]
pub struct SimulatedTimeHandler {
    now_ms: Arc<AtomicU64>,
    slept_ms: Arc<AtomicU64>,
}

impl SimulatedTimeHandler {
    /// Create a clock starting at `timestamp` seconds
    pub fn new(timestamp: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(timestamp.saturating_mul(1000))),
            slept_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set absolute time in seconds; may move backwards
    pub fn set_time(&self, timestamp: u64) {
        self.now_ms
            .store(timestamp.saturating_mul(1000), Ordering::SeqCst);
    }

    /// Advance by whole seconds
    pub fn advance_secs(&self, secs: u64) {
        self.now_ms
            .fetch_add(secs.saturating_mul(1000), Ordering::SeqCst);
    }

    /// Total milliseconds callers have slept
    pub fn total_slept_ms(&self) -> u64 {
        self.slept_ms.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhysicalTimeEffects for SimulatedTimeHandler {
    async fn current_timestamp(&self) -> Result<u64, TimeError> {
        Ok(self.now_ms.load(Ordering::SeqCst) / 1000)
    }

    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
        self.slept_ms.fetch_add(ms, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(())
    }
}
