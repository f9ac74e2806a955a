//! In-memory storage backend

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::traits::{KvBackend, Version, VersionedValue};
use crate::error::{CryptStoreError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, VersionedValue>,
    last_revision: u64,
}

/// Process-local backend, used by tests and embedders that bring their own persistence
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| CryptStoreError::Backend("memory backend lock poisoned".to_string()))
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<Version>,
    ) -> Result<Version> {
        let mut state = self.lock()?;

        let current = state.entries.get(key).map(|entry| entry.version);
        if current != expected {
            debug!(
                "CAS conflict on {}: expected {:?}, current {:?}",
                key, expected, current
            );
            return Err(CryptStoreError::ConcurrencyConflict {
                key: key.to_string(),
            });
        }

        state.last_revision += 1;
        let version = Version::from_raw(state.last_revision)
            .ok_or_else(|| CryptStoreError::Backend("revision counter overflow".to_string()))?;
        state.entries.insert(
            key.to_string(),
            VersionedValue {
                value: value.to_vec(),
                version,
            },
        );

        Ok(version)
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}
