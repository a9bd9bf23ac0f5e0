//! Guestbook CLI Library
//!
//! Command handlers behind the `guestbook` binary. Each handler opens the local ledger
//! through the filesystem storage handler, runs one operation and writes its report to
//! the supplied writer so the same code serves the terminal and the tests.

#![forbid(unsafe_code)]

/// Command handlers, one module per subcommand
pub mod commands;
