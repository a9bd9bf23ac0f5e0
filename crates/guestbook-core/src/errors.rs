//! Unified guestbook error type
//!
//! The ledger itself only fails validation. Everything between a caller and the
//! authoritative ledger (storage, clock, host queue) surfaces as
//! `TransientUnavailable`, which callers may retry without risk to ledger state.

use crate::effects::{StorageError, TimeError};
use serde::{Deserialize, Serialize};

/// Result alias used across the guestbook crates
pub type Result<T> = std::result::Result<T, GuestbookError>;

/// Errors surfaced by guestbook operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum GuestbookError {
    /// Input failed a precondition; nothing was changed
    #[error("{reason}")]
    Validation {
        /// Human readable reason, reported verbatim
        reason: String,
    },

    /// The authoritative ledger could not be reached or the write could not be made durable
    #[error("Ledger unavailable: {reason}")]
    TransientUnavailable {
        /// What failed
        reason: String,
    },

    /// Persisted state failed to decode or violates a ledger invariant
    #[error("Ledger snapshot corrupted: {reason}")]
    Corrupted {
        /// What was wrong with the snapshot
        reason: String,
    },

    /// Configuration rejected
    #[error("Invalid configuration: {reason}")]
    Config {
        /// Field and reason
        reason: String,
    },
}

impl GuestbookError {
    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a transient availability error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::TransientUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a corruption error
    pub fn corrupted(reason: impl Into<String>) -> Self {
        Self::Corrupted {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Whether resubmitting the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientUnavailable { .. })
    }
}

impl From<StorageError> for GuestbookError {
    fn from(err: StorageError) -> Self {
        Self::unavailable(err.to_string())
    }
}

impl From<TimeError> for GuestbookError {
    fn from(err: TimeError) -> Self {
        Self::unavailable(err.to_string())
    }
}
