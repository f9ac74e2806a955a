//! AES-256-GCM keyed directly by SHA-256 of the passphrase
//!
//! - Key: SHA-256(passphrase), no salt and no iteration count. Existing stores
//!   depend on this exact derivation.
//! - Nonce: 12 bytes (96 bits), fresh from the OS RNG for every seal
//! - Tag: 16 bytes (128 bits), appended to the ciphertext
//!
//! Sealed values are framed with [`StorageLayout`].

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use super::layout::StorageLayout;
use super::secure_memory::{DerivedKey, KEY_SIZE};
use crate::error::{CryptStoreError, Result};

/// Nonce length required by AES-GCM
pub const NONCE_SIZE: usize = 12;

/// Derive the cipher key by hashing the passphrase bytes once
pub fn derive_key(passphrase: &[u8]) -> DerivedKey {
    let mut digest = Sha256::digest(passphrase);
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();

    let derived = DerivedKey::new(key);
    key.zeroize();
    derived
}

/// Authenticated cipher bound to one passphrase
///
/// Built once per passphrase entry and dropped at the end of the operation.
pub struct Cipher {
    aead: Aes256Gcm,
}

impl Cipher {
    /// Build a cipher from a passphrase
    pub fn new(passphrase: &[u8]) -> Result<Self> {
        let key = derive_key(passphrase);
        let aead = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CryptStoreError::Crypto(format!("cipher construction failed: {}", e)))?;
        Ok(Self { aead })
    }

    /// Seal `plaintext` under a fresh nonce and return the framed form
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| CryptStoreError::Crypto(format!("nonce generation failed: {}", e)))?;

        let ciphertext = self
            .aead
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptStoreError::Crypto("encryption failed".to_string()))?;

        StorageLayout::new(nonce.to_vec(), ciphertext).encode()
    }

    /// Unframe and open a value produced by [`Cipher::encrypt`]
    ///
    /// A wrong passphrase and a tampered payload both fail authentication and
    /// cannot be told apart. Malformed framing fails earlier with a
    /// [`CryptStoreError::Framing`] error.
    pub fn decrypt(&self, framed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let layout = StorageLayout::decode(framed)?;

        if layout.nonce.len() != NONCE_SIZE {
            return Err(CryptStoreError::Crypto(format!(
                "invalid nonce length: expected {}, got {}",
                NONCE_SIZE,
                layout.nonce.len()
            )));
        }

        self.aead
            .decrypt(Nonce::from_slice(&layout.nonce), layout.value.as_slice())
            .map(Zeroizing::new)
            .map_err(|_| {
                CryptStoreError::Crypto(
                    "authentication failed - wrong passphrase or corrupted data".to_string(),
                )
            })
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}
