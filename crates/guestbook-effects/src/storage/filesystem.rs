//! Filesystem storage handler
//!
//! One file per key under a base directory. Writes go to a temporary sibling and are
//! renamed into place, so a crash mid-write leaves the previous value intact.
//!
//! A host claims the directory through [`StorageEffects::acquire_exclusive`], which
//! creates `guestbook.lock` and removes it when the last clone of the handler drops.
//! A lock left behind by a crashed process has to be removed by hand.

use async_trait::async_trait;
use guestbook_core::effects::{StorageEffects, StorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Maximum key length accepted
const MAX_KEY_LEN: usize = 255;

/// Lock file claimed by the writing host
pub const LOCK_FILE: &str = "guestbook.lock";

/// Lock file owned by this process; removed on drop
#[derive(Debug)]
struct DirLock {
    path: PathBuf,
}

impl Drop for DirLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release storage lock");
        } else {
            debug!(path = %self.path.display(), "released storage lock");
        }
    }
}

/// Filesystem-backed storage handler
#[derive(Debug, Clone)]
pub struct FilesystemStorageHandler {
    base_path: PathBuf,
    lock: Arc<OnceLock<DirLock>>,
}

impl FilesystemStorageHandler {
    /// Create a handler rooted at `base_path`, creating the directory if needed
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::Unavailable(format!(
                "failed to create storage directory {}: {e}",
                base_path.display()
            ))
        })?;

        info!("Initialized guestbook storage at {:?}", base_path);
        Ok(Self {
            base_path,
            lock: Arc::new(OnceLock::new()),
        })
    }

    /// Directory holding the data files
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey {
                reason: "Key cannot be empty".to_string(),
            });
        }

        if key.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey {
                reason: format!("Key too long (max {MAX_KEY_LEN} characters)"),
            });
        }

        // Keys map directly to file names
        if key.contains("..") || key.contains('\0') || key.contains('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey {
                reason: "Key contains invalid characters".to_string(),
            });
        }

        Ok(())
    }

    fn key_to_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Self::validate_key(key)?;
        Ok(self.base_path.join(format!("{key}.dat")))
    }

    /// Whether this handler holds the directory lock
    pub fn holds_lock(&self) -> bool {
        self.lock.get().is_some()
    }
}

async fn write_synced(path: &Path, value: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(value).await?;
    file.sync_all().await
}

#[async_trait]
impl StorageEffects for FilesystemStorageHandler {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let path = self.key_to_path(key)?;
        let tmp_path = path.with_extension("dat.tmp");

        let written = match write_synced(&tmp_path, &value).await {
            Ok(()) => fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // Never leave a partial value behind
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::WriteFailed(format!("{}: {e}", path.display())));
        }

        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(format!("{}: {e}", path.display()))),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!("{}: {e}", path.display()))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.key_to_path(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::ReadFailed(format!("{}: {e}", path.display())))
    }

    async fn acquire_exclusive(&self) -> Result<(), StorageError> {
        if self.holds_lock() {
            return Ok(());
        }

        let path = self.base_path.join(LOCK_FILE);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(&path).await.unwrap_or_default();
                return Err(StorageError::Locked(format!(
                    "{} is held by pid {}",
                    path.display(),
                    holder.trim()
                )));
            }
            Err(e) => {
                return Err(StorageError::Unavailable(format!("{}: {e}", path.display())));
            }
        };

        // From here on the file is ours and must be removed on drop
        let lock = DirLock { path };
        file.write_all(std::process::id().to_string().as_bytes())
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {e}", lock.path.display())))?;

        info!(path = %lock.path.display(), "acquired storage lock");
        let _ = self.lock.set(lock);
        Ok(())
    }
}
