//! Path management for docfill configuration files.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves the files docfill reads at startup.
///
/// # Directory Structure
///
/// ```text
/// <config_dir>/docfill/      # e.g. ~/.config/docfill on Linux
/// ├── config.toml            # Server, oracle and extraction settings
/// └── secret.json            # API keys
/// ```
pub struct DocfillPaths;

impl DocfillPaths {
    const APP_DIR: &'static str = "docfill";

    /// Returns the docfill configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to `secret.json`.
    ///
    /// # Security Note
    ///
    /// The file holds plaintext API keys and should be readable by the
    /// owner only (e.g. mode 600).
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
