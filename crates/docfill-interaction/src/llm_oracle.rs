//! Network-backed semantic oracle.

use crate::backend::CompletionBackend;
use crate::prompts;
use crate::response;
use async_trait::async_trait;
use docfill_core::config::DEFAULT_MAX_DOCUMENT_CHARS;
use docfill_core::oracle::{FieldGuidance, FieldOracle, OracleError, truncate_document};
use std::collections::HashMap;
use std::sync::Arc;

/// A [`FieldOracle`] that prompts a language model through a [`CompletionBackend`].
#[derive(Clone)]
pub struct LlmOracle {
    backend: Arc<dyn CompletionBackend>,
    max_document_chars: usize,
}

impl LlmOracle {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
        }
    }

    /// Sets the character cap applied to document text in prompts.
    pub fn with_max_document_chars(mut self, max_document_chars: usize) -> Self {
        self.max_document_chars = max_document_chars;
        self
    }

    async fn ask(&self, system: &str, prompt: &str, call: &str) -> Result<String, OracleError> {
        tracing::debug!(
            provider = self.backend.name(),
            model = self.backend.model(),
            call,
            prompt_chars = prompt.len(),
            "Calling oracle"
        );
        let result = self.backend.complete(system, prompt).await;
        if let Err(err) = &result {
            tracing::debug!(
                provider = self.backend.name(),
                call,
                error = %err,
                "Oracle call failed"
            );
        }
        result
    }
}

#[async_trait]
impl FieldOracle for LlmOracle {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn detect_fields(&self, document_text: &str) -> Result<Vec<String>, OracleError> {
        let document = truncate_document(document_text, self.max_document_chars);
        let prompt = prompts::detection_prompt(&document)?;
        let content = self.ask(prompts::DETECTION_SYSTEM, &prompt, "detect").await?;

        let names: Vec<String> = response::parse_json(&content)?;
        Ok(names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }

    async fn classify_and_phrase(
        &self,
        fields: &[String],
    ) -> Result<HashMap<String, FieldGuidance>, OracleError> {
        if fields.is_empty() {
            return Ok(HashMap::new());
        }
        let prompt = prompts::phrasing_prompt(fields)?;
        let content = self.ask(prompts::PHRASING_SYSTEM, &prompt, "phrase").await?;
        response::parse_guidance(&content)
    }

    async fn resolve_placeholders(
        &self,
        document_text: &str,
        fields: &[String],
    ) -> Result<HashMap<String, String>, OracleError> {
        if fields.is_empty() {
            return Ok(HashMap::new());
        }
        let document = truncate_document(document_text, self.max_document_chars);
        let prompt = prompts::resolution_prompt(&document, fields)?;
        let content = self.ask(prompts::RESOLUTION_SYSTEM, &prompt, "resolve").await?;
        response::parse_resolution(&content)
    }
}
