//! JSON-file credential store.
//!
//! All entries live in a single JSON object. Every write goes to a sibling
//! temp file that is then renamed over the original, so readers never see a
//! half-written file. On Unix the temp file is created with mode `0600`,
//! so the token is never readable by other users.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::instrument;

use super::{CredentialKey, CredentialStore, StoreError};

/// Credential store persisted to a JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store backed by `path`. The file and its parent directory are
    /// created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");

        // The mode only applies on creation, so a stale temp file must go.
        match tokio::fs::remove_file(&tmp).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }

        let mut file = private_options()
            .open(&tmp)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(&json).await.map_err(|e| self.io_error(e))?;
        file.sync_all().await.map_err(|e| self.io_error(e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn update<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        mutate(&mut entries);
        self.write(&entries).await
    }
}

/// Options for a new temp file, owner read/write only on Unix.
fn private_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    options
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.remove(key.as_str()))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        let value = value.to_owned();
        self.update(move |entries| {
            entries.insert(key.as_str().to_owned(), value);
        })
        .await
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key.as_str());
        })
        .await
    }

    async fn entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear_all(&self) -> Result<(), StoreError> {
        self.update(BTreeMap::clear).await
    }
}
