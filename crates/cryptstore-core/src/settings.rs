//! Helper settings
//!
//! Non-sensitive configuration in a plain JSON file. Command-line flags
//! override whatever is set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CryptStoreError, Result};

/// Store file name placed in the home directory by default
pub const DEFAULT_STORE_FILE_NAME: &str = ".git-credential-crypt-store";

/// How the passphrase is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Read from the controlling terminal
    #[default]
    Terminal,
    /// Graphical dialog through zenity
    Zenity,
}

/// Helper settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Location of the encrypted store (defaults to `~/.git-credential-crypt-store`)
    pub store_file: Option<PathBuf>,
    /// Passphrase prompt to use
    pub prompt: PromptMode,
}

impl Settings {
    /// Default location of the settings file
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "git-credential-crypt-store")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Get the effective store file location
    pub fn effective_store_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store_file {
            return Ok(path.clone());
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(DEFAULT_STORE_FILE_NAME))
            .ok_or_else(|| {
                CryptStoreError::Backend("Could not determine home directory".to_string())
            })
    }
}
