//! # Guestbook Effects - Handlers and Runtime
//!
//! Concrete implementations of the effect traits from `guestbook-core`, plus the two
//! runtime roles that sit on either side of the authoritative ledger:
//!
//! - [`GuestbookHost`] owns the ledger, serializes every mutation through one writer
//!   task, persists before committing, and broadcasts `NewSignature` events.
//! - [`GuestbookClient`] treats the ledger as a remote, possibly failing service:
//!   it separates submission from confirmation, retries transient failures, and can
//!   rebuild the recent window from observed events when reads are unavailable.
//!
//! ## Handlers
//!
//! - **Time**: [`RealTimeHandler`] (system clock), [`SimulatedTimeHandler`] (tests)
//! - **Storage**: [`MemoryStorageHandler`] (with fault injection),
//!   [`FilesystemStorageHandler`] (atomic file writes)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Client-side access with retry and event fallback
pub mod client;

/// Client error type
pub mod errors;

/// Authoritative single-writer host
pub mod host;

/// Retry policy
pub mod retry;

/// Service abstraction shared by host and clients
pub mod service;

/// Storage handlers
pub mod storage;

/// Time handlers
pub mod time;

pub use client::GuestbookClient;
pub use errors::ClientError;
pub use host::{GuestbookHost, PendingSignature, SignatureReceipt, SubmissionId};
pub use retry::RetryPolicy;
pub use service::GuestbookService;
pub use storage::{FilesystemStorageHandler, MemoryStorageHandler};
pub use time::{RealTimeHandler, SimulatedTimeHandler};
