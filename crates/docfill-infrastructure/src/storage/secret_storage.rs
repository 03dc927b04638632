//! Secret configuration file storage.
//!
//! Loads API keys from `<config_dir>/docfill/secret.json`.

use crate::paths::DocfillPaths;
use docfill_core::config::SecretConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Secret file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            // serde_json errors only carry line/column, never the offending value
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine config directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Read-only access to `secret.json`.
///
/// Does NOT:
/// - Write or modify secret files
/// - Validate API keys against providers
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a SecretStorage for the default secret file location.
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = DocfillPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a SecretStorage with a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded and parsed
    /// - `Err(SecretStorageError::NotFound)`: File doesn't exist
    /// - `Err(SecretStorageError::IoError)`: Failed to read file
    /// - `Err(SecretStorageError::ParseError)`: Invalid JSON format
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields an empty config.
    pub fn load_or_default(&self) -> Result<SecretConfig, SecretStorageError> {
        match self.load() {
            Err(SecretStorageError::NotFound(_)) => Ok(SecretConfig::default()),
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_secret() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"gemini": {{"api_key": "g-key", "model_name": "gemini-2.0-flash"}}, "openai": {{"api_key": "o-key"}}}}"#
        )
        .unwrap();

        let config = SecretStorage::with_path(file.path().to_path_buf())
            .load()
            .unwrap();

        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "g-key");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(config.openai.unwrap().api_key, "o-key");
    }

    #[test]
    fn test_load_missing_file() {
        let storage = SecretStorage::with_path(PathBuf::from("/nonexistent/secret.json"));
        assert!(matches!(storage.load(), Err(SecretStorageError::NotFound(_))));
        assert_eq!(storage.load_or_default().unwrap(), SecretConfig::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ invalid json").unwrap();

        let result = SecretStorage::with_path(file.path().to_path_buf()).load();
        assert!(matches!(result, Err(SecretStorageError::ParseError(_))));
    }
}
