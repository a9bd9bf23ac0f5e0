//! Storage effects
//!
//! Byte-oriented key/value persistence. The host keeps the whole ledger snapshot under
//! a single key, so handlers only need whole-value reads and atomic whole-value writes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors raised by storage handlers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StorageError {
    /// Key rejected by the handler
    #[error("Invalid storage key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },
    /// Read failed
    #[error("Storage read failed: {0}")]
    ReadFailed(String),
    /// Write failed
    #[error("Storage write failed: {0}")]
    WriteFailed(String),
    /// Delete failed
    #[error("Storage delete failed: {0}")]
    DeleteFailed(String),
    /// Backend cannot be reached at all
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
    /// Another writer holds the backend
    #[error("Storage locked: {0}")]
    Locked(String),
}

/// Key/value storage
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Store `value` under `key`, replacing any previous value atomically.
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Retrieve the value under `key`, if any.
    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove `key`. Returns whether a value existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// Whether `key` holds a value.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Claim sole write access to the backend until this handler is dropped.
    ///
    /// Fails with [`StorageError::Locked`] while another handler holds it. Backends
    /// private to one process have nothing to claim.
    async fn acquire_exclusive(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Blanket implementation for Arc<T> where T: StorageEffects
#[async_trait]
impl<T: StorageEffects + ?Sized> StorageEffects for std::sync::Arc<T> {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        (**self).store(key, value).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).retrieve(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        (**self).exists(key).await
    }

    async fn acquire_exclusive(&self) -> Result<(), StorageError> {
        (**self).acquire_exclusive().await
    }
}
