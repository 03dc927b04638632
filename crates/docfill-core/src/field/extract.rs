//! Placeholder extraction.
//!
//! Two strategies produce the field set of a document:
//!
//! - deterministic: `{{token}}` matching, exact and infallible
//! - oracle: a [`FieldOracle`] that also understands `[Field Name]` and
//!   context-dependent `$[____]` blanks
//!
//! Both return normalized, deduplicated identifiers in lexicographic order.

use super::normalize::normalize_field_name;
use crate::error::{DocfillError, Result};
use crate::oracle::FieldOracle;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumString};

static DOUBLE_BRACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([A-Za-z0-9_.]+)\}\}").expect("double-brace pattern is a valid regex")
});

/// The fixed delimiter pattern used by deterministic extraction and exact-mode filling.
///
/// Capture group 1 holds the token between the braces.
pub fn double_brace_pattern() -> &'static Regex {
    &DOUBLE_BRACE
}

/// Which strategy the extractor applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExtractionMode {
    /// Only `{{token}}` matching
    Deterministic,
    /// Only the semantic oracle; failures are surfaced
    Oracle,
    /// Oracle first when configured, deterministic as fallback
    #[default]
    Auto,
}

/// Strategy that produced a field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExtractionSource {
    Deterministic,
    Oracle,
}

/// Result of a successful extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// At least one field was found
    Fields {
        fields: Vec<String>,
        source: ExtractionSource,
    },
    /// The document contains no recognizable placeholders
    NoPlaceholders,
}

impl ExtractionOutcome {
    fn from_fields(fields: Vec<String>, source: ExtractionSource) -> Self {
        if fields.is_empty() {
            ExtractionOutcome::NoPlaceholders
        } else {
            ExtractionOutcome::Fields { fields, source }
        }
    }

    pub fn fields(&self) -> &[String] {
        match self {
            ExtractionOutcome::Fields { fields, .. } => fields,
            ExtractionOutcome::NoPlaceholders => &[],
        }
    }
}

/// Scans text for `{{token}}` placeholders.
///
/// Tokens may contain alphanumerics, dots and underscores. The result is
/// normalized, deduplicated and sorted.
pub fn extract_deterministic(text: &str) -> Vec<String> {
    normalize_names(
        DOUBLE_BRACE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str()),
    )
}

/// Normalizes raw names, drops names that normalize to nothing, deduplicates and sorts.
pub fn normalize_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .map(normalize_field_name)
        .filter(|name| !name.is_empty() && name.chars().any(|c| c != '_'))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Runs the configured extraction strategy over plain document text.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderExtractor {
    mode: ExtractionMode,
}

impl PlaceholderExtractor {
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// Extracts the field set of a document.
    ///
    /// # Errors
    ///
    /// - `QuotaExhausted` / `OracleTimeout` when the oracle hit a provider
    ///   limit and no deterministic placeholder was found either
    /// - `ExtractionFailed` for any other oracle failure under the same
    ///   condition, or when oracle mode is requested without an oracle
    ///
    /// An empty result is `Ok(ExtractionOutcome::NoPlaceholders)`, not an error.
    pub async fn extract(
        &self,
        document_text: &str,
        oracle: Option<&dyn FieldOracle>,
    ) -> Result<ExtractionOutcome> {
        match (self.mode, oracle) {
            (ExtractionMode::Deterministic, _) | (ExtractionMode::Auto, None) => Ok(
                ExtractionOutcome::from_fields(
                    extract_deterministic(document_text),
                    ExtractionSource::Deterministic,
                ),
            ),
            (ExtractionMode::Oracle, None) => Err(DocfillError::ExtractionFailed(
                "oracle extraction requested but no semantic oracle is configured".to_string(),
            )),
            (ExtractionMode::Oracle, Some(oracle)) => {
                let fields = Self::extract_with_oracle(oracle, document_text)
                    .await
                    .map_err(|e| e.into_extraction_error())?;
                Ok(ExtractionOutcome::from_fields(fields, ExtractionSource::Oracle))
            }
            (ExtractionMode::Auto, Some(oracle)) => {
                match Self::extract_with_oracle(oracle, document_text).await {
                    Ok(fields) if !fields.is_empty() => Ok(ExtractionOutcome::Fields {
                        fields,
                        source: ExtractionSource::Oracle,
                    }),
                    Ok(_) => {
                        tracing::debug!(
                            oracle = oracle.name(),
                            "Oracle found no fields, trying deterministic extraction"
                        );
                        Ok(ExtractionOutcome::from_fields(
                            extract_deterministic(document_text),
                            ExtractionSource::Deterministic,
                        ))
                    }
                    Err(err) => {
                        let fields = extract_deterministic(document_text);
                        if fields.is_empty() {
                            return Err(err.into_extraction_error());
                        }
                        tracing::warn!(
                            oracle = oracle.name(),
                            error = %err,
                            "Oracle extraction failed, using deterministic fields"
                        );
                        Ok(ExtractionOutcome::Fields {
                            fields,
                            source: ExtractionSource::Deterministic,
                        })
                    }
                }
            }
        }
    }

    async fn extract_with_oracle(
        oracle: &dyn FieldOracle,
        document_text: &str,
    ) -> std::result::Result<Vec<String>, crate::oracle::OracleError> {
        let names = oracle.detect_fields(document_text).await?;
        Ok(normalize_names(names.iter().map(String::as_str)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{FieldGuidance, OracleError};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedOracle(std::result::Result<Vec<String>, OracleError>);

    #[async_trait]
    impl FieldOracle for FixedOracle {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn detect_fields(&self, _: &str) -> std::result::Result<Vec<String>, OracleError> {
            self.0.clone()
        }

        async fn classify_and_phrase(
            &self,
            _: &[String],
        ) -> std::result::Result<HashMap<String, FieldGuidance>, OracleError> {
            Ok(HashMap::new())
        }

        async fn resolve_placeholders(
            &self,
            _: &str,
            _: &[String],
        ) -> std::result::Result<HashMap<String, String>, OracleError> {
            Ok(HashMap::new())
        }
    }

    #[test]
    fn test_deterministic_dedups_and_sorts() {
        let text = "Pay {{amount}} to {{client_name}}. Total: {{amount}}.";
        assert_eq!(extract_deterministic(text), vec!["amount", "client_name"]);
    }

    #[test]
    fn test_deterministic_ignores_other_syntaxes() {
        let text = "[Company Name] owes $[_____] to {{ spaced }} and {{bad-token}}";
        assert!(extract_deterministic(text).is_empty());
    }

    #[test]
    fn test_deterministic_normalizes_case_and_dots() {
        let text = "{{Client.Name}} {{client_name}}";
        assert_eq!(extract_deterministic(text), vec!["client_name", "clientname"]);
    }

    #[test]
    fn test_normalize_names_drops_blank_names() {
        let names = ["Company Name", "[]", "$[_____]", "company name"];
        assert_eq!(normalize_names(names), vec!["company_name"]);
    }

    #[tokio::test]
    async fn test_no_placeholders_is_not_an_error() {
        let extractor = PlaceholderExtractor::new(ExtractionMode::Deterministic);
        let outcome = extractor.extract("Plain text", None).await.unwrap();
        assert_eq!(outcome, ExtractionOutcome::NoPlaceholders);
    }

    #[tokio::test]
    async fn test_oracle_names_are_normalized() {
        let oracle = FixedOracle(Ok(vec![
            "Investor Name".to_string(),
            "Company Name".to_string(),
            "investor name".to_string(),
        ]));
        let extractor = PlaceholderExtractor::new(ExtractionMode::Oracle);
        let outcome = extractor.extract("...", Some(&oracle)).await.unwrap();
        assert_eq!(
            outcome,
            ExtractionOutcome::Fields {
                fields: vec!["company_name".to_string(), "investor_name".to_string()],
                source: ExtractionSource::Oracle,
            }
        );
    }

    #[tokio::test]
    async fn test_auto_falls_back_to_deterministic() {
        let oracle = FixedOracle(Err(OracleError::Unavailable("offline".into())));
        let extractor = PlaceholderExtractor::default();
        let outcome = extractor
            .extract("Dear {{name}}", Some(&oracle))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ExtractionOutcome::Fields {
                fields: vec!["name".to_string()],
                source: ExtractionSource::Deterministic,
            }
        );
    }

    #[tokio::test]
    async fn test_auto_surfaces_quota_when_nothing_matched() {
        let oracle = FixedOracle(Err(OracleError::QuotaExhausted("429".into())));
        let extractor = PlaceholderExtractor::default();
        let err = extractor
            .extract("[Company Name]", Some(&oracle))
            .await
            .unwrap_err();
        assert!(err.is_quota_exhausted());
    }

    #[tokio::test]
    async fn test_oracle_mode_without_oracle_fails() {
        let extractor = PlaceholderExtractor::new(ExtractionMode::Oracle);
        let err = extractor.extract("{{name}}", None).await.unwrap_err();
        assert!(matches!(err, DocfillError::ExtractionFailed(_)));
    }
}
