//! Guestbook notifications
//!
//! Every committed append produces exactly one `NewSignature`. Observers that cannot
//! read the ledger directly can rebuild the recent window from the events they saw
//! with [`replay_recent`].

use crate::types::{Entry, SignerAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Notification emitted for external observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GuestbookEvent {
    /// A signature was appended at `index`
    NewSignature {
        /// Insertion position of the new entry
        index: usize,
        /// Account that signed
        signer: SignerAddress,
        /// Signed text
        message: String,
        /// Host time in seconds
        timestamp: u64,
    },
}

impl GuestbookEvent {
    pub(crate) fn new_signature(index: usize, entry: &Entry) -> Self {
        Self::NewSignature {
            index,
            signer: entry.signer(),
            message: entry.message().to_string(),
            timestamp: entry.timestamp(),
        }
    }

    /// Insertion position carried by the event
    pub fn index(&self) -> usize {
        match self {
            Self::NewSignature { index, .. } => *index,
        }
    }

    /// The entry this event announced
    pub fn to_entry(&self) -> Entry {
        match self {
            Self::NewSignature {
                signer,
                message,
                timestamp,
                ..
            } => Entry::new(*signer, message.clone(), *timestamp),
        }
    }
}

/// Rebuild the newest-first window of up to `count` entries from observed events.
///
/// Events may arrive duplicated or out of order; they are keyed by index, so the
/// result matches what `last_signatures(count)` would have returned over the
/// entries those events cover.
pub fn replay_recent<'a, I>(events: I, count: usize) -> Vec<Entry>
where
    I: IntoIterator<Item = &'a GuestbookEvent>,
{
    let by_index: BTreeMap<usize, &GuestbookEvent> =
        events.into_iter().map(|event| (event.index(), event)).collect();

    by_index
        .values()
        .rev()
        .take(count)
        .map(|event| event.to_entry())
        .collect()
}
