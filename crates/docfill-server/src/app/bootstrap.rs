//! Composition root: turns loaded configuration into a ready [`AppState`].

use super::state::AppState;
use docfill_application::{DocumentUseCase, SessionStore};
use docfill_core::config::AppConfig;
use docfill_core::field::{ExtractionMode, PlaceholderExtractor};
use docfill_infrastructure::config_service::LoadedConfig;
use docfill_interaction::{OracleSettings, build_oracle};
use std::sync::Arc;
use std::time::Duration;

/// Oracle settings for field detection and placeholder resolution.
pub fn detection_settings(app: &AppConfig) -> OracleSettings {
    OracleSettings {
        provider: app.oracle.provider,
        model: app.oracle.model.clone(),
        timeout: Duration::from_secs(app.oracle.timeout_secs),
        max_document_chars: app.oracle.max_document_chars,
    }
}

/// Oracle settings for question phrasing. Timeout and truncation are shared
/// with the detection oracle.
pub fn question_settings(app: &AppConfig) -> OracleSettings {
    OracleSettings {
        provider: app.questions.provider,
        model: app.questions.model.clone(),
        timeout: Duration::from_secs(app.oracle.timeout_secs),
        max_document_chars: app.oracle.max_document_chars,
    }
}

/// Wires the store, oracles and use case together.
pub fn build_state(config: &LoadedConfig) -> AppState {
    let detection_oracle = build_oracle(&detection_settings(&config.app), &config.secrets);
    let question_oracle = build_oracle(&question_settings(&config.app), &config.secrets);

    let mode = config.app.extraction.mode;
    if mode == ExtractionMode::Oracle && detection_oracle.is_none() {
        tracing::warn!("Extraction mode is 'oracle' but no oracle is available; uploads will fail");
    }

    tracing::info!(
        extraction = ?mode,
        detection_oracle = ?detection_oracle.as_ref().map(|o| o.name()),
        question_oracle = ?question_oracle.as_ref().map(|o| o.name()),
        "Document service configured"
    );

    AppState::new(DocumentUseCase::new(
        Arc::new(SessionStore::new()),
        PlaceholderExtractor::new(mode),
        detection_oracle,
        question_oracle,
    ))
}
