//! The append-only guestbook ledger
//!
//! `GuestbookLedger` owns the entry sequence and exposes exactly three capabilities:
//! append a signature, count entries, and read a newest-first window. There is no way
//! to remove or edit an entry.
//!
//! Appends are split into `prepare` and `commit` so a host can make the candidate entry
//! durable before it becomes visible. `sign_book` runs both steps for in-process use.

use crate::errors::{GuestbookError, Result};
use crate::event::GuestbookEvent;
use crate::types::{Entry, SignerAddress};
use crate::EMPTY_MESSAGE_REASON;

/// An entry that passed validation and is waiting to be committed at `index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    index: usize,
    entry: Entry,
}

impl PendingEntry {
    /// Position the entry will occupy once committed
    pub fn index(&self) -> usize {
        self.index
    }

    /// The candidate entry
    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

/// Append-only store of guestbook entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestbookLedger {
    entries: Vec<Entry>,
    max_message_bytes: Option<usize>,
}

impl GuestbookLedger {
    /// Create an empty ledger with no message length limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger that rejects messages longer than `max_message_bytes`
    pub fn with_message_limit(max_message_bytes: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            max_message_bytes,
        }
    }

    pub(crate) fn from_entries(entries: Vec<Entry>, max_message_bytes: Option<usize>) -> Self {
        Self {
            entries,
            max_message_bytes,
        }
    }

    /// Configured message length limit, if any
    pub fn message_limit(&self) -> Option<usize> {
        self.max_message_bytes
    }

    /// Check a message against the ledger's preconditions without touching state.
    ///
    /// Emptiness is checked as-is: a message of only whitespace is accepted.
    pub fn validate_message(&self, message: &str) -> Result<()> {
        if message.is_empty() {
            return Err(GuestbookError::validation(EMPTY_MESSAGE_REASON));
        }
        if let Some(limit) = self.max_message_bytes {
            if message.len() > limit {
                return Err(GuestbookError::validation(format!(
                    "Message exceeds {limit} bytes"
                )));
            }
        }
        Ok(())
    }

    /// Validate and build the entry that the next append would create.
    ///
    /// The timestamp never goes below the newest entry's timestamp, so a host clock
    /// that steps backwards cannot break chronological order.
    pub fn prepare(
        &self,
        signer: SignerAddress,
        message: impl Into<String>,
        now: u64,
    ) -> Result<PendingEntry> {
        let message = message.into();
        self.validate_message(&message)?;

        let timestamp = match self.entries.last() {
            Some(newest) if newest.timestamp() > now => {
                tracing::debug!(
                    now,
                    newest = newest.timestamp(),
                    "host clock behind newest entry, clamping"
                );
                newest.timestamp()
            }
            _ => now,
        };

        Ok(PendingEntry {
            index: self.entries.len(),
            entry: Entry::new(signer, message, timestamp),
        })
    }

    /// Append a prepared entry.
    ///
    /// Fails if another entry was committed after `pending` was prepared.
    pub fn commit(&mut self, pending: PendingEntry) -> Result<GuestbookEvent> {
        if pending.index != self.entries.len() {
            return Err(GuestbookError::unavailable(format!(
                "stale append: prepared for index {}, ledger holds {}",
                pending.index,
                self.entries.len()
            )));
        }

        let event = GuestbookEvent::new_signature(pending.index, &pending.entry);
        self.entries.push(pending.entry);
        Ok(event)
    }

    /// Append a signature from `signer` stamped with `now`.
    pub fn sign_book(
        &mut self,
        signer: SignerAddress,
        message: impl Into<String>,
        now: u64,
    ) -> Result<GuestbookEvent> {
        let pending = self.prepare(signer, message, now)?;
        self.commit(pending)
    }

    /// Number of entries ever appended
    pub fn total_signatures(&self) -> usize {
        self.entries.len()
    }

    /// Borrowing view of up to `count` newest entries, newest first
    pub fn recent_window(&self, count: usize) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter().rev().take(count)
    }

    /// Up to `count` newest entries, newest first
    pub fn last_signatures(&self, count: usize) -> Vec<Entry> {
        self.recent_window(count).cloned().collect()
    }

    /// Entry at insertion position `index`
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Most recently appended entry
    pub fn newest(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter()
    }

    /// Whether no entry has been appended yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    const ALICE: SignerAddress = SignerAddress::repeat(0xa1);
    const BOB: SignerAddress = SignerAddress::repeat(0xb0);

    fn ledger_with(messages: &[&str]) -> GuestbookLedger {
        let mut ledger = GuestbookLedger::new();
        for (i, message) in messages.iter().enumerate() {
            ledger.sign_book(ALICE, *message, 1_000 + i as u64).unwrap();
        }
        ledger
    }

    fn messages(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(Entry::message).collect()
    }

    #[test]
    fn sign_records_signer_and_message() {
        let mut ledger = GuestbookLedger::new();
        ledger.sign_book(ALICE, "Hello, Base!", 1_700_000_000).unwrap();

        assert_eq!(ledger.total_signatures(), 1);
        let last = ledger.last_signatures(1);
        assert_eq!(last[0].signer(), ALICE);
        assert_eq!(last[0].message(), "Hello, Base!");
        assert_eq!(last[0].timestamp(), 1_700_000_000);
    }

    #[test]
    fn empty_message_rejected_without_state_change() {
        let mut ledger = ledger_with(&["one"]);
        let err = ledger.sign_book(ALICE, "", 5_000).unwrap_err();

        assert_matches!(err, GuestbookError::Validation { ref reason } if reason == "Message cannot be empty");
        assert_eq!(ledger.total_signatures(), 1);
    }

    #[test]
    fn whitespace_message_is_not_empty() {
        let mut ledger = GuestbookLedger::new();
        ledger.sign_book(ALICE, "   ", 1).unwrap();
        assert_eq!(ledger.total_signatures(), 1);
    }

    #[test]
    fn sign_emits_new_signature() {
        let mut ledger = ledger_with(&["first"]);
        let event = ledger.sign_book(BOB, "Test message", 2_000).unwrap();

        assert_eq!(
            event,
            GuestbookEvent::NewSignature {
                index: 1,
                signer: BOB,
                message: "Test message".to_string(),
                timestamp: 2_000,
            }
        );
    }

    #[test]
    fn same_address_may_sign_repeatedly() {
        let ledger = ledger_with(&["First message", "Second message"]);
        assert_eq!(ledger.total_signatures(), 2);
    }

    #[test]
    fn different_addresses_are_recorded() {
        let mut ledger = GuestbookLedger::new();
        ledger.sign_book(ALICE, "From signer 1", 10).unwrap();
        ledger.sign_book(BOB, "From signer 2", 11).unwrap();

        let signers: Vec<_> = ledger.iter().map(Entry::signer).collect();
        assert_eq!(signers, vec![ALICE, BOB]);
    }

    #[test]
    fn window_is_newest_first() {
        let ledger = ledger_with(&["First", "Second", "Third"]);
        assert_eq!(
            messages(&ledger.last_signatures(3)),
            vec!["Third", "Second", "First"]
        );
    }

    #[test]
    fn window_limited_to_count() {
        let ledger = ledger_with(&["One", "Two", "Three", "Four", "Five"]);
        let last = ledger.last_signatures(3);
        assert_eq!(last.len(), 3);
        assert_eq!(last[0].message(), "Five");
    }

    #[test]
    fn over_requesting_returns_everything() {
        let ledger = ledger_with(&["One", "Two"]);
        assert_eq!(ledger.last_signatures(100).len(), 2);
    }

    #[test]
    fn empty_ledger_window_is_empty() {
        let ledger = GuestbookLedger::new();
        assert!(ledger.last_signatures(10).is_empty());
        assert_eq!(ledger.total_signatures(), 0);
    }

    #[test]
    fn zero_window_is_empty() {
        let ledger = ledger_with(&["a", "b"]);
        assert!(ledger.last_signatures(0).is_empty());
    }

    #[test]
    fn backwards_clock_is_clamped() {
        let mut ledger = GuestbookLedger::new();
        ledger.sign_book(ALICE, "later", 500).unwrap();
        ledger.sign_book(ALICE, "earlier clock", 400).unwrap();

        let stamps: Vec<_> = ledger.iter().map(Entry::timestamp).collect();
        assert_eq!(stamps, vec![500, 500]);
    }

    #[test]
    fn equal_timestamps_order_by_insertion() {
        let mut ledger = GuestbookLedger::new();
        for message in ["a", "b", "c"] {
            ledger.sign_book(ALICE, message, 42).unwrap();
        }
        assert_eq!(messages(&ledger.last_signatures(3)), vec!["c", "b", "a"]);
    }

    #[test]
    fn stale_commit_rejected() {
        let mut ledger = GuestbookLedger::new();
        let first = ledger.prepare(ALICE, "one", 1).unwrap();
        let second = ledger.prepare(BOB, "two", 1).unwrap();

        ledger.commit(first).unwrap();
        assert_matches!(
            ledger.commit(second),
            Err(GuestbookError::TransientUnavailable { .. })
        );
        assert_eq!(ledger.total_signatures(), 1);
    }

    #[test]
    fn message_limit_is_opt_in() {
        let mut ledger = GuestbookLedger::with_message_limit(Some(4));
        ledger.sign_book(ALICE, "four", 1).unwrap();
        assert_matches!(
            ledger.sign_book(ALICE, "five!", 2),
            Err(GuestbookError::Validation { .. })
        );

        let mut unbounded = GuestbookLedger::new();
        unbounded.sign_book(ALICE, "x".repeat(10_000), 1).unwrap();
    }

    proptest! {
        #[test]
        fn count_tracks_successful_signs(messages in proptest::collection::vec(".{0,8}", 0..40)) {
            let mut ledger = GuestbookLedger::new();
            let mut accepted = 0usize;
            for (i, message) in messages.iter().enumerate() {
                if ledger.sign_book(ALICE, message.clone(), i as u64).is_ok() {
                    accepted += 1;
                }
            }
            let non_empty = messages.iter().filter(|m| !m.is_empty()).count();
            prop_assert_eq!(accepted, non_empty);
            prop_assert_eq!(ledger.total_signatures(), accepted);
        }

        #[test]
        fn window_is_reverse_insertion(total in 0usize..30, requested in 0usize..40) {
            let mut ledger = GuestbookLedger::new();
            for i in 0..total {
                ledger.sign_book(BOB, format!("m{i}"), 7).unwrap();
            }

            let window = ledger.last_signatures(requested);
            prop_assert_eq!(window.len(), requested.min(total));
            for (offset, entry) in window.iter().enumerate() {
                let expected = format!("m{}", total - 1 - offset);
                prop_assert_eq!(entry.message(), expected.as_str());
            }
        }

        #[test]
        fn reads_are_idempotent(total in 0usize..20, requested in 0usize..25) {
            let mut ledger = GuestbookLedger::new();
            for i in 0..total {
                ledger.sign_book(ALICE, format!("m{i}"), i as u64).unwrap();
            }
            prop_assert_eq!(ledger.last_signatures(requested), ledger.last_signatures(requested));
            prop_assert_eq!(ledger.total_signatures(), ledger.total_signatures());
        }

        #[test]
        fn timestamps_never_decrease(clock in proptest::collection::vec(0u64..1_000, 1..40)) {
            let mut ledger = GuestbookLedger::new();
            for now in &clock {
                ledger.sign_book(ALICE, "tick", *now).unwrap();
            }
            let stamps: Vec<_> = ledger.iter().map(Entry::timestamp).collect();
            prop_assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
