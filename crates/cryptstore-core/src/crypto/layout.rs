//! On-disk storage layout for sealed values
//!
//! Format: `{nonce_b64}_{ciphertext_b64}`
//! - Both segments use the standard base64 alphabet without padding
//! - `_` is outside that alphabet, so the delimiter is never ambiguous
//!
//! This is a persistent format. Changing the delimiter or the encoding breaks
//! every existing store and needs a migration.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;

use crate::error::{CryptStoreError, Result};

/// Separates the nonce segment from the ciphertext segment
pub const STORAGE_DELIMITER: char = '_';

/// A nonce and the ciphertext (with tag) sealed under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub nonce: Vec<u8>,
    pub value: Vec<u8>,
}

impl StorageLayout {
    pub fn new(nonce: Vec<u8>, value: Vec<u8>) -> Self {
        Self { nonce, value }
    }

    /// Serialize to the framed form. Both parts must be non-empty.
    pub fn encode(&self) -> Result<String> {
        if self.nonce.is_empty() {
            return Err(CryptStoreError::Framing(
                "cannot encode an empty nonce".to_string(),
            ));
        }
        if self.value.is_empty() {
            return Err(CryptStoreError::Framing(
                "cannot encode an empty value".to_string(),
            ));
        }

        let mut framed = STANDARD_NO_PAD.encode(&self.nonce);
        framed.push(STORAGE_DELIMITER);
        STANDARD_NO_PAD.encode_string(&self.value, &mut framed);
        Ok(framed)
    }

    /// Parse the framed form. Lengths are not checked here; the cipher does that.
    pub fn decode(framed: &[u8]) -> Result<Self> {
        if framed.is_empty() {
            return Err(CryptStoreError::Framing("empty input".to_string()));
        }

        let parts: Vec<&[u8]> = framed
            .split(|b| *b == STORAGE_DELIMITER as u8)
            .collect();
        if parts.len() != 2 {
            return Err(CryptStoreError::Framing(format!(
                "expected exactly one '{}' delimiter, found {}",
                STORAGE_DELIMITER,
                parts.len() - 1
            )));
        }

        let nonce = STANDARD_NO_PAD
            .decode(parts[0])
            .map_err(|e| CryptStoreError::Framing(format!("invalid nonce base64: {}", e)))?;
        let value = STANDARD_NO_PAD
            .decode(parts[1])
            .map_err(|e| CryptStoreError::Framing(format!("invalid value base64: {}", e)))?;

        Ok(Self { nonce, value })
    }
}
