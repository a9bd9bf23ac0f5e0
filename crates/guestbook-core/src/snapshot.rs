//! Persisted ledger layout
//!
//! A snapshot is the ordered entry list serialized as JSON, nothing more. Decoding
//! re-checks the ledger invariants so a tampered or truncated file is rejected rather
//! than served.

use crate::errors::{GuestbookError, Result};
use crate::ledger::{GuestbookLedger, PendingEntry};
use crate::types::Entry;
use serde::{Deserialize, Serialize};

/// Serialized form of a ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Entries in insertion order
    pub entries: Vec<Entry>,
}

#[derive(Serialize)]
struct SnapshotView<'a> {
    entries: Vec<&'a Entry>,
}

impl LedgerSnapshot {
    /// Capture the current ledger contents
    pub fn capture(ledger: &GuestbookLedger) -> Self {
        Self {
            entries: ledger.iter().cloned().collect(),
        }
    }

    /// Encode a snapshot as JSON bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| GuestbookError::unavailable(format!("snapshot encoding failed: {e}")))
    }

    /// Encode `ledger` as if `pending` had already been committed.
    ///
    /// Lets a host persist the next state before making it visible.
    pub fn encode_with_pending(ledger: &GuestbookLedger, pending: &PendingEntry) -> Result<Vec<u8>> {
        let view = SnapshotView {
            entries: ledger.iter().chain(std::iter::once(pending.entry())).collect(),
        };
        serde_json::to_vec(&view)
            .map_err(|e| GuestbookError::unavailable(format!("snapshot encoding failed: {e}")))
    }

    /// Decode JSON bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| GuestbookError::corrupted(format!("undecodable snapshot: {e}")))
    }

    /// Check invariants and build a ledger.
    ///
    /// The message limit applies to future appends only.
    pub fn into_ledger(self, max_message_bytes: Option<usize>) -> Result<GuestbookLedger> {
        if let Some(position) = self.entries.iter().position(|e| e.message().is_empty()) {
            return Err(GuestbookError::corrupted(format!(
                "entry {position} has an empty message"
            )));
        }
        if let Some(position) = self
            .entries
            .windows(2)
            .position(|pair| pair[0].timestamp() > pair[1].timestamp())
        {
            return Err(GuestbookError::corrupted(format!(
                "entry {} is older than entry {position}",
                position + 1
            )));
        }
        Ok(GuestbookLedger::from_entries(self.entries, max_message_bytes))
    }
}
