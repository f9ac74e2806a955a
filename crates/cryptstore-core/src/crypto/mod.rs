//! Cryptographic primitives for encrypted credential storage
//!
//! This module provides:
//! - AES-256-GCM sealing keyed by a hashed passphrase
//! - The `nonce_ciphertext` storage layout for sealed values
//! - Secure memory handling with zeroize

mod cipher;
mod layout;
mod secure_memory;

pub use cipher::{derive_key, Cipher, NONCE_SIZE};
pub use layout::{StorageLayout, STORAGE_DELIMITER};
pub use secure_memory::{DerivedKey, SecretString, KEY_SIZE};
