//! Builds oracles from configuration.

use crate::backend::CompletionBackend;
use crate::gemini_backend::{DEFAULT_GEMINI_MODEL, GeminiBackend};
use crate::llm_oracle::LlmOracle;
use crate::offline_oracle::OfflineOracle;
use crate::openai_backend::{DEFAULT_OPENAI_MODEL, OpenAiBackend};
use docfill_core::config::{OracleProvider, SecretConfig};
use docfill_core::oracle::{FieldOracle, OracleError};
use std::sync::Arc;
use std::time::Duration;

/// Settings shared by every oracle built for one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleSettings {
    pub provider: OracleProvider,
    /// Overrides both the secret file's model name and the provider default
    pub model: Option<String>,
    pub timeout: Duration,
    pub max_document_chars: usize,
}

/// Builds the oracle for `settings`, or `None` when it is disabled or unusable.
///
/// A network provider without an API key degrades to `None` with a warning
/// instead of failing startup.
pub fn build_oracle(
    settings: &OracleSettings,
    secrets: &SecretConfig,
) -> Option<Arc<dyn FieldOracle>> {
    let backend: Arc<dyn CompletionBackend> = match settings.provider {
        OracleProvider::None => return None,
        OracleProvider::Offline => return Some(Arc::new(OfflineOracle::new())),
        provider @ (OracleProvider::Gemini | OracleProvider::OpenAi) => {
            match build_backend(provider, settings, secrets) {
                Ok(backend) => backend,
                Err(err) => {
                    tracing::warn!(
                        provider = %provider,
                        error = %err,
                        "Semantic oracle unavailable, continuing without it"
                    );
                    return None;
                }
            }
        }
    };

    tracing::info!(
        provider = backend.name(),
        model = backend.model(),
        "Semantic oracle configured"
    );
    Some(Arc::new(
        LlmOracle::new(backend).with_max_document_chars(settings.max_document_chars),
    ))
}

fn build_backend(
    provider: OracleProvider,
    settings: &OracleSettings,
    secrets: &SecretConfig,
) -> Result<Arc<dyn CompletionBackend>, OracleError> {
    let key = secrets
        .for_provider(provider)
        .ok_or_else(|| OracleError::NotConfigured(format!("no API key for {provider}")))?;

    let model = settings
        .model
        .clone()
        .or_else(|| key.model_name.clone())
        .unwrap_or_else(|| match provider {
            OracleProvider::OpenAi => DEFAULT_OPENAI_MODEL.to_string(),
            _ => DEFAULT_GEMINI_MODEL.to_string(),
        });

    let backend: Arc<dyn CompletionBackend> = match provider {
        OracleProvider::OpenAi => {
            Arc::new(OpenAiBackend::new(&key.api_key, model, settings.timeout)?)
        }
        _ => Arc::new(GeminiBackend::new(&key.api_key, model, settings.timeout)?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_core::config::ApiKeyConfig;

    fn settings(provider: OracleProvider) -> OracleSettings {
        OracleSettings {
            provider,
            model: None,
            timeout: Duration::from_secs(5),
            max_document_chars: 100,
        }
    }

    #[test]
    fn test_disabled_and_offline() {
        let secrets = SecretConfig::default();
        assert!(build_oracle(&settings(OracleProvider::None), &secrets).is_none());
        assert_eq!(
            build_oracle(&settings(OracleProvider::Offline), &secrets)
                .unwrap()
                .name(),
            "offline"
        );
    }

    #[test]
    fn test_missing_key_degrades_to_none() {
        let secrets = SecretConfig::default();
        assert!(build_oracle(&settings(OracleProvider::Gemini), &secrets).is_none());
        assert!(build_oracle(&settings(OracleProvider::OpenAi), &secrets).is_none());
    }

    #[test]
    fn test_keyed_providers() {
        let secrets = SecretConfig {
            gemini: Some(ApiKeyConfig {
                api_key: "g".into(),
                model_name: None,
            }),
            openai: Some(ApiKeyConfig {
                api_key: "o".into(),
                model_name: Some("gpt-4".into()),
            }),
        };
        assert_eq!(
            build_oracle(&settings(OracleProvider::Gemini), &secrets)
                .unwrap()
                .name(),
            "gemini"
        );
        assert_eq!(
            build_oracle(&settings(OracleProvider::OpenAi), &secrets)
                .unwrap()
                .name(),
            "openai"
        );
    }
}
