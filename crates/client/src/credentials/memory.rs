//! In-memory credential store for tests and throwaway sessions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialKey, CredentialStore, StoreError};

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key.as_str()).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.as_str().to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.entries.write().await.remove(key.as_str());
        Ok(())
    }

    async fn entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryCredentialStore::new();
        assert!(store.get(CredentialKey::AuthToken).await.unwrap().is_none());

        store.set(CredentialKey::AuthToken, "tok").await.unwrap();
        assert_eq!(
            store.get(CredentialKey::AuthToken).await.unwrap().as_deref(),
            Some("tok")
        );

        store.remove(CredentialKey::AuthToken).await.unwrap();
        store.remove(CredentialKey::AuthToken).await.unwrap();
        assert!(store.get(CredentialKey::AuthToken).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = MemoryCredentialStore::new();
        store.set(CredentialKey::UserData, "{}").await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.entries().await.unwrap().is_empty());
    }
}
