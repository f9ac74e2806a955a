//! Storage trait definitions

use std::fmt;
use std::num::NonZeroU64;

use crate::error::Result;

/// Opaque revision of a stored key, as reported by the backend
///
/// A key that has never been written has no version at all, so "no prior
/// value" is expressed as `Option::<Version>::None` rather than a zero sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version(NonZeroU64);

impl Version {
    /// Build from a raw revision number, `None` for zero
    pub fn from_raw(revision: u64) -> Option<Self> {
        NonZeroU64::new(revision).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored value together with the revision it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: Version,
}

/// Key-value backend with optimistic concurrency
///
/// Implementations must make `compare_and_swap` atomic with respect to every
/// other writer of the same key.
pub trait KvBackend: Send + Sync {
    /// Read a key, `None` if it has never been written
    fn get(&self, key: &str) -> Result<Option<VersionedValue>>;

    /// Write `value` only if the key is still at `expected`
    ///
    /// `expected == None` succeeds only if the key does not exist yet.
    /// A mismatch fails with `CryptStoreError::ConcurrencyConflict`.
    fn compare_and_swap(&self, key: &str, value: &[u8], expected: Option<Version>)
        -> Result<Version>;

    /// Get a human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}
