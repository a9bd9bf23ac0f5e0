//! Physical time effects
//!
//! Entries are stamped with host time in whole seconds. Sleeping is part of the same
//! trait so client backoff can run against a simulated clock in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// The clock could not be read
    #[error("Clock unavailable: {reason}")]
    ClockUnavailable {
        /// Underlying cause
        reason: String,
    },
    /// Sleeping failed or was interrupted
    #[error("Sleep failed: {reason}")]
    SleepFailed {
        /// Underlying cause
        reason: String,
    },
}

/// Wall-clock time source
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current Unix timestamp in seconds.
    async fn current_timestamp(&self) -> Result<u64, TimeError>;

    /// Suspend the caller for `ms` milliseconds of this clock's time.
    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError>;
}

/// Blanket implementation for Arc<T> where T: PhysicalTimeEffects
#[async_trait]
impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for std::sync::Arc<T> {
    async fn current_timestamp(&self) -> Result<u64, TimeError> {
        (**self).current_timestamp().await
    }

    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        (**self).sleep_ms(ms).await
    }
}
