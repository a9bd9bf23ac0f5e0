//! Effect trait definitions
//!
//! Pure trait definitions for the side effects the guestbook runtime performs.
//! This module defines **what** effects exist; `guestbook-effects` provides the handlers.
//!
//! - **Time**: host clock used to stamp entries, plus sleeping for client backoff
//! - **Storage**: key/value bytes used to persist the ledger snapshot
//!
//! All runtime code is parameterized by these traits so tests can swap in
//! simulated clocks and failing storage.

/// Key/value persistence
pub mod storage;

/// Host clock and sleeping
pub mod time;

pub use storage::{StorageEffects, StorageError};
pub use time::{PhysicalTimeEffects, TimeError};
