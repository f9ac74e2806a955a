//! # cryptstore-core
//!
//! Core of the encrypted git credential store:
//! - AES-256-GCM sealing keyed by SHA-256 of a passphrase
//! - `nonce_ciphertext` storage layout for sealed passwords
//! - Versioned credential container over any compare-and-swap backend
//! - Credential URL form, identity matching and the helper line protocol
//! - Store / lookup / erase workflows with zeroize-on-drop secrets

pub mod credential;
pub mod crypto;
pub mod error;
pub mod prompt;
pub mod settings;
pub mod storage;
mod crypt_store;

pub use credential::{parse_credential, write_credential, CredentialRecord};
pub use crypt_store::CryptStore;
pub use crypto::{Cipher, SecretString, StorageLayout};
pub use error::{CryptStoreError, Result};
pub use prompt::PassphrasePrompt;
pub use settings::{PromptMode, Settings};
pub use storage::{
    ContainerStore, FileBackend, KvBackend, MemoryBackend, StorageContainer, Version,
};
