//! # Guestbook Core - Domain Crate
//!
//! **Purpose**: Define the guestbook ledger, its entries and notifications, and the
//! effect interfaces the runtime is parameterized by.
//!
//! # Architecture Constraints
//!
//! - YES Ledger state and its pure operations (`append`, `count`, `recent_window`)
//! - YES Entry, address and event types
//! - YES Snapshot layout and load-time invariant checks
//! - YES Effect trait definitions (time, storage)
//! - NO effect handler implementations (those live in `guestbook-effects`)
//! - NO mutation scheduling or client retry logic (also `guestbook-effects`)
//!
//! ## Core Concepts
//!
//! - **Ledger**: append-only sequence of entries; insertion order is chronological order
//! - **Entry**: immutable `(signer, message, timestamp)` record
//! - **Window**: the newest-first slice returned by `last_signatures`
//! - **NewSignature**: the fixed notification emitted for every committed append

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration loading, environment overrides and validation
pub mod config;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified guestbook error type
pub mod errors;

/// Notifications and event replay
pub mod event;

/// The append-only ledger
pub mod ledger;

/// Persisted ledger layout
pub mod snapshot;

/// Addresses and entries
pub mod types;

pub use config::{
    BackoffStrategy, ClientConfig, GuestbookConfig, HostConfig, LedgerConfig, RetryConfig,
    StorageConfig,
};
pub use errors::{GuestbookError, Result};
pub use event::{replay_recent, GuestbookEvent};
pub use ledger::{GuestbookLedger, PendingEntry};
pub use snapshot::LedgerSnapshot;
pub use types::{AddressParseError, Entry, SignerAddress};

/// Reason reported when a signature carries no text.
pub const EMPTY_MESSAGE_REASON: &str = "Message cannot be empty";
