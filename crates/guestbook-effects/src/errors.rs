//! Client error type

use crate::host::SubmissionId;
use guestbook_core::GuestbookError;

/// Errors surfaced by [`crate::GuestbookClient`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Error reported by the ledger, passed through unchanged
    #[error(transparent)]
    Ledger(#[from] GuestbookError),

    /// Transient failures persisted through every attempt
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetryExhausted {
        /// Operation that was retried
        operation: &'static str,
        /// Attempts made
        attempts: u32,
        /// Final failure
        last_error: GuestbookError,
    },

    /// The host accepted the submission but no confirmation arrived in time.
    ///
    /// The signature may still be committed later.
    #[error("no confirmation for {submission_id} after {timeout_ms}ms")]
    ConfirmationTimeout {
        /// Submission still in flight
        submission_id: SubmissionId,
        /// How long the client waited
        timeout_ms: u64,
    },
}

impl ClientError {
    /// Whether the request was rejected for invalid input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Ledger(GuestbookError::Validation { .. }))
    }
}
