//! Versioned container of stored credential URLs

use std::sync::Arc;

use tracing::debug;

use super::traits::{KvBackend, Version};
use crate::error::Result;

/// Backend key holding the whole container
pub const CREDENTIALS_KEY: &str = "creds";

/// Ordered list of stored credential URLs plus the revision it was read at
///
/// `version == None` means the key did not exist when the container was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageContainer {
    pub credential_urls: Vec<String>,
    pub version: Option<Version>,
}

impl StorageContainer {
    pub fn len(&self) -> usize {
        self.credential_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credential_urls.is_empty()
    }

    /// Append an entry at the tail
    pub fn push(&mut self, credential_url: String) {
        self.credential_urls.push(credential_url);
    }

    /// Remove the entry at `index`, shifting later entries down
    pub fn remove(&mut self, index: usize) -> String {
        self.credential_urls.remove(index)
    }
}

/// Reads and writes the credential container through a [`KvBackend`]
pub struct ContainerStore {
    backend: Arc<dyn KvBackend>,
}

impl ContainerStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Read the container; a missing key yields an empty one
    pub fn get_container(&self) -> Result<StorageContainer> {
        match self.backend.get(CREDENTIALS_KEY)? {
            Some(stored) => {
                let credential_urls: Vec<String> = serde_json::from_slice(&stored.value)?;
                debug!(
                    "Loaded {} entries at version {} from {} backend",
                    credential_urls.len(),
                    stored.version,
                    self.backend.backend_name()
                );
                Ok(StorageContainer {
                    credential_urls,
                    version: Some(stored.version),
                })
            }
            None => {
                debug!("No stored credentials yet");
                Ok(StorageContainer::default())
            }
        }
    }

    /// Write the container back, conditional on the version it was read at
    ///
    /// A concurrent write since the read fails with
    /// `CryptStoreError::ConcurrencyConflict`; nothing is retried here.
    pub fn persist_container(&self, container: &StorageContainer) -> Result<Version> {
        let data = serde_json::to_vec(&container.credential_urls)?;
        let version = self
            .backend
            .compare_and_swap(CREDENTIALS_KEY, &data, container.version)?;

        debug!("Persisted {} entries at version {}", container.len(), version);
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptStoreError;
    use crate::storage::MemoryBackend;

    fn test_store() -> (ContainerStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (ContainerStore::new(backend.clone()), backend)
    }

    #[test]
    fn test_empty_store_bootstrap() {
        let (store, _) = test_store();

        let container = store.get_container().unwrap();
        assert!(container.is_empty());
        assert_eq!(container.version, None);
    }

    #[test]
    fn test_persist_and_reload() {
        let (store, backend) = test_store();

        let mut container = store.get_container().unwrap();
        container.push("https://alice@example.com".to_string());
        container.push("https://bob@example.org".to_string());
        let version = store.persist_container(&container).unwrap();

        let reloaded = store.get_container().unwrap();
        assert_eq!(reloaded.credential_urls, container.credential_urls);
        assert_eq!(reloaded.version, Some(version));

        // stored as a JSON array of strings
        let raw = backend.get(CREDENTIALS_KEY).unwrap().unwrap();
        let parsed: Vec<String> = serde_json::from_slice(&raw.value).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let (store, _) = test_store();
        store.persist_container(&StorageContainer::default()).unwrap();

        let mut first = store.get_container().unwrap();
        let mut second = store.get_container().unwrap();

        first.push("https://alice@example.com".to_string());
        store.persist_container(&first).unwrap();

        second.push("https://bob@example.com".to_string());
        assert!(matches!(
            store.persist_container(&second),
            Err(CryptStoreError::ConcurrencyConflict { .. })
        ));

        let current = store.get_container().unwrap();
        assert_eq!(current.credential_urls, vec!["https://alice@example.com"]);
    }

    #[test]
    fn test_initial_insert_race_conflicts() {
        let (store, _) = test_store();

        let mut first = store.get_container().unwrap();
        let mut second = store.get_container().unwrap();
        assert_eq!(second.version, None);

        first.push("https://alice@example.com".to_string());
        store.persist_container(&first).unwrap();

        second.push("https://bob@example.com".to_string());
        assert!(matches!(
            store.persist_container(&second),
            Err(CryptStoreError::ConcurrencyConflict { .. })
        ));
    }

    #[test]
    fn test_corrupt_container_is_an_error() {
        let (store, backend) = test_store();
        backend
            .compare_and_swap(CREDENTIALS_KEY, b"not json", None)
            .unwrap();

        assert!(matches!(
            store.get_container(),
            Err(CryptStoreError::Serialization(_))
        ));
    }
}
