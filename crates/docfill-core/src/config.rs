//! Application configuration model.
//!
//! Loaded from `config.toml` and environment overrides by the infrastructure
//! layer. API keys live separately in [`SecretConfig`].

use crate::field::ExtractionMode;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 10_000;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub oracle: OracleConfig,
    pub extraction: ExtractionConfig,
    pub questions: QuestionsConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Which semantic oracle backs a capability.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OracleProvider {
    #[default]
    Gemini,
    OpenAi,
    /// Deterministic in-process oracle, no network
    Offline,
    None,
}

/// Oracle used for field detection and placeholder resolution.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OracleConfig {
    pub provider: OracleProvider,
    /// Model name; the provider default is used when absent
    pub model: Option<String>,
    pub timeout_secs: u64,
    /// Document text longer than this is truncated before being sent
    pub max_document_chars: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: OracleProvider::Gemini,
            model: None,
            timeout_secs: DEFAULT_ORACLE_TIMEOUT_SECS,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
}

/// Oracle used for question phrasing and type refinement.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct QuestionsConfig {
    pub provider: OracleProvider,
    pub model: Option<String>,
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            provider: OracleProvider::OpenAi,
            model: None,
        }
    }
}

/// Root structure of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<ApiKeyConfig>,
    #[serde(default)]
    pub openai: Option<ApiKeyConfig>,
}

impl SecretConfig {
    pub fn for_provider(&self, provider: OracleProvider) -> Option<&ApiKeyConfig> {
        match provider {
            OracleProvider::Gemini => self.gemini.as_ref(),
            OracleProvider::OpenAi => self.openai.as_ref(),
            OracleProvider::Offline | OracleProvider::None => None,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ApiKeyConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl std::fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .finish()
    }
}
