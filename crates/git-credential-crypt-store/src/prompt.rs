//! Passphrase prompts for the helper
//!
//! stdin and stdout carry the git protocol, so the terminal prompt talks to
//! the controlling TTY and the zenity prompt to a dialog.

use std::process::Command;

use tracing::debug;
use zeroize::Zeroizing;

use cryptstore_core::{CryptStoreError, PassphrasePrompt, PromptMode, Result, SecretString};

/// Dialog title shown by zenity
const DIALOG_TITLE: &str = "Encryption Key Password";

/// Build the prompt selected in the settings
pub fn build(mode: PromptMode) -> Box<dyn PassphrasePrompt> {
    match mode {
        PromptMode::Terminal => Box::new(TerminalPrompt),
        PromptMode::Zenity => Box::new(ZenityPrompt),
    }
}

/// Reads the passphrase from the controlling terminal without echo
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read(message: &str) -> Result<SecretString> {
        let entry = SecretString::new(rpassword::prompt_password(message)?);
        // an empty answer is how a terminal user backs out
        if entry.is_empty() {
            return Err(CryptStoreError::PromptCancelled);
        }
        Ok(entry)
    }
}

impl PassphrasePrompt for TerminalPrompt {
    fn prompt(&self, context: &str) -> Result<SecretString> {
        Self::read(&format!("Passphrase for {}: ", context))
    }

    fn prompt_with_confirmation(&self, context: &str) -> Result<SecretString> {
        let first = Self::read(&format!("New passphrase for {}: ", context))?;
        let second = Self::read("Confirm passphrase: ")?;
        if first.expose() != second.expose() {
            return Err(CryptStoreError::PromptMismatch);
        }
        Ok(first)
    }
}

/// Asks through zenity dialogs
pub struct ZenityPrompt;

impl ZenityPrompt {
    /// Run zenity and return its stdout; a non-zero exit means the user cancelled
    fn run(command: &mut Command) -> Result<Zeroizing<String>> {
        let output = command.output()?;
        let stdout = Zeroizing::new(output.stdout);
        if !output.status.success() {
            debug!("zenity exited with {}", output.status);
            return Err(CryptStoreError::PromptCancelled);
        }

        let text = std::str::from_utf8(&stdout)
            .map_err(|_| CryptStoreError::Input("zenity returned invalid UTF-8".to_string()))?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

impl PassphrasePrompt for ZenityPrompt {
    fn prompt(&self, context: &str) -> Result<SecretString> {
        let output = Self::run(
            Command::new("zenity")
                .arg("--entry")
                .arg("--hide-text")
                .args(["--title", DIALOG_TITLE])
                .arg("--text")
                .arg(format!("Enter the passphrase for {}", context)),
        )?;

        let entry = SecretString::from(strip_newline(&output));
        if entry.is_empty() {
            return Err(CryptStoreError::PromptCancelled);
        }
        Ok(entry)
    }

    fn prompt_with_confirmation(&self, context: &str) -> Result<SecretString> {
        let output = Self::run(
            Command::new("zenity")
                .arg("--forms")
                .args(["--title", DIALOG_TITLE])
                .arg("--text")
                .arg(format!("Create a passphrase to encrypt the password for {}", context))
                .args(["--add-password", "Passphrase"])
                .args(["--add-password", "Confirm passphrase"])
                .args(["--separator", "\n"]),
        )?;

        split_confirmation(&output)
    }
}

fn strip_newline(output: &str) -> &str {
    let output = output.strip_suffix('\n').unwrap_or(output);
    output.strip_suffix('\r').unwrap_or(output)
}

/// Parse the two newline-separated fields of the confirmation form
fn split_confirmation(output: &str) -> Result<SecretString> {
    let (first, second) = strip_newline(output)
        .split_once('\n')
        .ok_or_else(|| CryptStoreError::Input("unexpected zenity form output".to_string()))?;

    if first.is_empty() {
        return Err(CryptStoreError::PromptCancelled);
    }
    if first != second {
        return Err(CryptStoreError::PromptMismatch);
    }
    Ok(SecretString::from(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_newline() {
        assert_eq!(strip_newline("hunter2\n"), "hunter2");
        assert_eq!(strip_newline("hunter2\r\n"), "hunter2");
        assert_eq!(strip_newline(" spaced \n"), " spaced ");
        assert_eq!(strip_newline(""), "");
    }

    #[test]
    fn test_split_confirmation() {
        assert_eq!(split_confirmation("pass|word\npass|word\n").unwrap().expose(), "pass|word");

        assert!(matches!(
            split_confirmation("one\ntwo\n"),
            Err(CryptStoreError::PromptMismatch)
        ));
        assert!(matches!(
            split_confirmation("\n\n"),
            Err(CryptStoreError::PromptCancelled)
        ));
        assert!(matches!(
            split_confirmation("single\n"),
            Err(CryptStoreError::Input(_))
        ));
    }
}
