//! Error types for cryptstore-core

use thiserror::Error;

/// Result type alias for credential store operations
pub type Result<T> = std::result::Result<T, CryptStoreError>;

/// Credential store error types
///
/// None of the messages carry passphrases, plaintext passwords or key material.
#[derive(Error, Debug)]
pub enum CryptStoreError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Storage layout error: {0}")]
    Framing(String),

    #[error("Concurrent modification of '{key}' - re-run the operation")]
    ConcurrencyConflict { key: String },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Credential is not valid to store: {0}")]
    Validation(String),

    #[error("Passphrase entry was cancelled")]
    PromptCancelled,

    #[error("Passphrase entries do not match")]
    PromptMismatch,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<url::ParseError> for CryptStoreError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err.to_string())
    }
}
