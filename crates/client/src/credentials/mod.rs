//! Persistent credential store.
//!
//! Three independent entries survive process restarts: the bearer token, the
//! store slug and a serialized [`UserRecord`](quickshop_core::UserRecord)
//! snapshot. Only [`ApiClient`](crate::ApiClient) writes them.

mod file;
mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

/// Keys of the persisted credential entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialKey {
    AuthToken,
    StoreSlug,
    UserData,
}

impl CredentialKey {
    /// Every key, in sign-in write order. The token goes last so an
    /// interrupted sign-in never leaves a token without a user snapshot.
    pub const ALL: [Self; 3] = [Self::UserData, Self::StoreSlug, Self::AuthToken];

    /// Storage key name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthToken => "auth_token",
            Self::StoreSlug => "store_slug",
            Self::UserData => "user_data",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from credential persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("credential file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Encoding a value for storage failed.
    #[error("failed to encode credential entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Async key-value persistence for credentials.
///
/// Implementations must be safe to share across tasks; the client holds one
/// as `Arc<dyn CredentialStore>`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read an entry.
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError>;

    /// Write an entry, replacing any previous value.
    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError>;

    /// Delete an entry. Deleting a missing entry is not an error.
    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError>;

    /// Every stored entry, including keys this crate does not own.
    async fn entries(&self) -> Result<BTreeMap<String, String>, StoreError>;

    /// Delete every stored entry.
    async fn clear_all(&self) -> Result<(), StoreError>;

    /// Delete several entries, attempting all of them and reporting the first
    /// failure.
    async fn remove_many(&self, keys: &[CredentialKey]) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.remove(*key).await {
                tracing::error!(key = %key, error = %e, "failed to remove credential entry");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Stored entries with the bearer token masked, for diagnostics.
///
/// # Errors
///
/// Returns `StoreError` if the store cannot be read.
pub async fn redacted_entries(
    store: &dyn CredentialStore,
) -> Result<Vec<(String, String)>, StoreError> {
    let entries = store.entries().await?;
    Ok(entries
        .into_iter()
        .map(|(key, value)| {
            if key == CredentialKey::AuthToken.as_str() {
                let masked = format!("[REDACTED] ({} chars)", value.chars().count());
                (key, masked)
            } else {
                (key, value)
            }
        })
        .collect())
}
