//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` and [`SecretConfig`] from
//! `secret.json`, then applies environment overrides. Missing files are not
//! an error: every setting has a default.

use crate::paths::DocfillPaths;
use crate::storage::SecretStorage;
use docfill_core::config::{ApiKeyConfig, AppConfig, OracleProvider, SecretConfig};
use docfill_core::error::{DocfillError, Result};
use docfill_core::field::ExtractionMode;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming an explicit `config.toml` path.
pub const CONFIG_PATH_ENV: &str = "DOCFILL_CONFIG";

/// Everything read at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    pub app: AppConfig,
    pub secrets: SecretConfig,
}

#[derive(Debug, Clone)]
pub struct ConfigService {
    config_path: Option<PathBuf>,
    secret_path: Option<PathBuf>,
}

impl ConfigService {
    /// Uses `DOCFILL_CONFIG` if set, the platform config directory otherwise.
    pub fn new() -> Self {
        let config_path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| DocfillPaths::config_file().ok());
        Self {
            config_path,
            secret_path: DocfillPaths::secret_file().ok(),
        }
    }

    /// Reads from explicit file locations.
    pub fn with_paths(config_path: PathBuf, secret_path: PathBuf) -> Self {
        Self {
            config_path: Some(config_path),
            secret_path: Some(secret_path),
        }
    }

    /// Loads files and applies overrides from the process environment.
    pub fn load(&self) -> Result<LoadedConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Loads files and applies overrides from `lookup`.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<LoadedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut app = match &self.config_path {
            Some(path) => load_app_config(path)?,
            None => {
                tracing::warn!("No config directory available, using default configuration");
                AppConfig::default()
            }
        };

        let mut secrets = match &self.secret_path {
            Some(path) => SecretStorage::with_path(path.clone())
                .load_or_default()
                .map_err(|e| DocfillError::config(e.to_string()))?,
            None => SecretConfig::default(),
        };

        apply_env_overrides(&mut app, &mut secrets, lookup)?;
        Ok(LoadedConfig { app, secrets })
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `config.toml`; a missing file yields the defaults.
pub fn load_app_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = toml::from_str(&content).map_err(|e| {
        DocfillError::config(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Applies environment overrides. Environment values win over file values.
///
/// | variable | setting |
/// |---|---|
/// | `PORT` | `server.port` |
/// | `ALLOWED_ORIGINS` | `server.allowed_origins` (comma separated) |
/// | `DOCFILL_ORACLE` | `oracle.provider` |
/// | `DOCFILL_EXTRACTION_MODE` | `extraction.mode` |
/// | `GEMINI_API_KEY`, `GEMINI_MODEL_NAME` | `secret.gemini` |
/// | `OPENAI_API_KEY`, `OPENAI_MODEL_NAME` | `secret.openai` |
pub fn apply_env_overrides<F>(
    app: &mut AppConfig,
    secrets: &mut SecretConfig,
    lookup: F,
) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(port) = get("PORT") {
        app.server.port = port
            .parse()
            .map_err(|_| DocfillError::config(format!("PORT is not a valid port: '{port}'")))?;
    }

    if let Some(origins) = get("ALLOWED_ORIGINS") {
        app.server.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(provider) = get("DOCFILL_ORACLE") {
        app.oracle.provider = OracleProvider::from_str(&provider).map_err(|_| {
            DocfillError::config(format!("DOCFILL_ORACLE has unknown provider '{provider}'"))
        })?;
    }

    if let Some(mode) = get("DOCFILL_EXTRACTION_MODE") {
        app.extraction.mode = ExtractionMode::from_str(&mode).map_err(|_| {
            DocfillError::config(format!("DOCFILL_EXTRACTION_MODE has unknown mode '{mode}'"))
        })?;
    }

    override_key(&mut secrets.gemini, get("GEMINI_API_KEY"), get("GEMINI_MODEL_NAME"));
    override_key(&mut secrets.openai, get("OPENAI_API_KEY"), get("OPENAI_MODEL_NAME"));

    Ok(())
}

fn override_key(entry: &mut Option<ApiKeyConfig>, api_key: Option<String>, model: Option<String>) {
    if let Some(api_key) = api_key {
        match entry {
            Some(existing) => existing.api_key = api_key,
            None => {
                *entry = Some(ApiKeyConfig {
                    api_key,
                    model_name: None,
                })
            }
        }
    }
    // A model name without any key has nothing to attach to.
    if let (Some(existing), Some(model)) = (entry.as_mut(), model) {
        existing.model_name = Some(model);
    }
}
