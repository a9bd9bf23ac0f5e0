//! CLI command handlers

/// Config loading, host startup and formatting shared by handlers
pub mod common;

/// `init`
pub mod init;

/// `total` and `last`
pub mod read;

/// `sign`
pub mod sign;

/// `status`
pub mod status;
