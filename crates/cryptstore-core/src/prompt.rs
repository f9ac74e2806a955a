//! Passphrase entry

use crate::crypto::SecretString;
use crate::error::Result;

/// Asks the user for the store passphrase
///
/// Implementations block until the user answers. Declining fails with
/// `CryptStoreError::PromptCancelled`.
pub trait PassphrasePrompt {
    /// Ask once, used to unlock an existing entry
    fn prompt(&self, context: &str) -> Result<SecretString>;

    /// Ask twice and compare, used before sealing a new entry
    ///
    /// Differing entries fail with `CryptStoreError::PromptMismatch`.
    fn prompt_with_confirmation(&self, context: &str) -> Result<SecretString>;
}
