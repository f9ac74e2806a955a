//! Single-file storage backend
//!
//! Keeps every key in a JSON file. Values are base64 encoded and carry the
//! revision they were written at. Writes go through a temp file and a
//! rename, and compare-and-swap holds an exclusive lock on `<store>.lock`
//! so that concurrent helper processes serialize on it. The OS drops the
//! lock when its holder exits, so a crashed helper never leaves the store
//! locked.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{KvBackend, Version, VersionedValue};
use crate::error::{CryptStoreError, Result};

/// Current on-disk file format
const FILE_FORMAT: u32 = 1;

/// File format for persistent storage
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    format: u32,
    /// Highest revision ever handed out; never reused
    last_revision: u64,
    entries: HashMap<String, StoredEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    /// base64 of the raw value
    value: String,
    revision: u64,
}

/// JSON file storage backend
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Open the store at `path`; nothing is created until the first write
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("File backend at {:?}", path);
        Self { path }
    }

    /// Get the store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    /// Open the lock file; the file itself stays behind between runs
    fn open_lock(&self) -> Result<RwLock<File>> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        Ok(RwLock::new(file))
    }

    fn lock_error(&self, e: io::Error) -> CryptStoreError {
        if e.kind() == ErrorKind::WouldBlock {
            CryptStoreError::Backend(format!(
                "store {:?} is locked by another process",
                self.path
            ))
        } else {
            e.into()
        }
    }

    /// Load the store file, `None` if it does not exist yet
    fn load(&self) -> Result<Option<StoreFile>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file: StoreFile = serde_json::from_str(&contents)?;
        if file.format != FILE_FORMAT {
            return Err(CryptStoreError::Backend(format!(
                "unsupported store file format {}",
                file.format
            )));
        }
        Ok(Some(file))
    }

    /// Write the store file atomically using a temp file
    fn save(&self, file: &StoreFile) -> Result<()> {
        let contents = serde_json::to_string_pretty(file)?;
        let temp_path = self.sibling(".tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>> {
        let Some(file) = self.load()? else {
            debug!("No store file at {:?}", self.path);
            return Ok(None);
        };

        match file.entries.get(key) {
            Some(entry) => {
                let value = STANDARD.decode(&entry.value).map_err(|e| {
                    CryptStoreError::Backend(format!("corrupt value for '{}': {}", key, e))
                })?;
                let version = Version::from_raw(entry.revision).ok_or_else(|| {
                    CryptStoreError::Backend(format!("corrupt revision for '{}'", key))
                })?;
                Ok(Some(VersionedValue { value, version }))
            }
            None => Ok(None),
        }
    }

    fn compare_and_swap(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<Version>,
    ) -> Result<Version> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut lock = self.open_lock()?;
        let _guard = lock.try_write().map_err(|e| self.lock_error(e))?;

        let mut file = self.load()?.unwrap_or_else(|| StoreFile {
            format: FILE_FORMAT,
            last_revision: 0,
            entries: HashMap::new(),
        });

        let current = file
            .entries
            .get(key)
            .and_then(|entry| Version::from_raw(entry.revision));
        if current != expected {
            debug!(
                "CAS conflict on {}: expected {:?}, current {:?}",
                key, expected, current
            );
            return Err(CryptStoreError::ConcurrencyConflict {
                key: key.to_string(),
            });
        }

        file.last_revision += 1;
        let version = Version::from_raw(file.last_revision)
            .ok_or_else(|| CryptStoreError::Backend("revision counter overflow".to_string()))?;
        file.entries.insert(
            key.to_string(),
            StoredEntry {
                value: STANDARD.encode(value),
                revision: version.get(),
            },
        );

        self.save(&file)?;
        debug!("Wrote {} at revision {}", key, version);
        Ok(version)
    }

    fn backend_name(&self) -> &'static str {
        "File"
    }
}
