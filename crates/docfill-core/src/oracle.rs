//! Semantic oracle interface.
//!
//! The oracle is an external collaborator that performs context-aware field
//! detection, question phrasing and placeholder resolution. The core only
//! depends on this trait; network-backed and offline implementations live in
//! the interaction layer.

use crate::error::DocfillError;
use crate::field::FieldType;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Marker appended to document text that was cut before being sent to an oracle.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Failure modes of a semantic oracle call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Rate limit or quota exhausted on the provider side
    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The request exceeded its timeout
    #[error("timed out: {0}")]
    Timeout(String),

    /// Transport failure or provider unreachable
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The provider answered, but not with the expected JSON shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Non-success HTTP status that is not a quota condition
    #[error("request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    /// No provider is configured for this capability
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl OracleError {
    /// Maps an oracle failure into the extraction error taxonomy.
    ///
    /// Quota and timeout conditions keep their own kinds so they survive
    /// end-to-end; everything else becomes `ExtractionFailed`.
    pub fn into_extraction_error(self) -> DocfillError {
        match self {
            OracleError::QuotaExhausted(msg) => DocfillError::QuotaExhausted(msg),
            OracleError::Timeout(msg) => DocfillError::OracleTimeout(msg),
            other => DocfillError::ExtractionFailed(other.to_string()),
        }
    }

    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, OracleError::QuotaExhausted(_))
    }
}

/// Phrased question and optional type override for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGuidance {
    pub question: String,
    pub field_type: Option<FieldType>,
}

/// Context-aware field extraction, classification and resolution provider.
///
/// Implementations must bound the duration of every call and report
/// provider-side limits as [`OracleError::QuotaExhausted`].
#[async_trait]
pub trait FieldOracle: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Returns human-readable names of the dynamic placeholders in a document.
    ///
    /// Names are returned as the provider phrases them (`"Company Name"`);
    /// callers normalize them.
    async fn detect_fields(&self, document_text: &str) -> Result<Vec<String>, OracleError>;

    /// Produces a natural question, and optionally an input type, per field.
    async fn classify_and_phrase(
        &self,
        fields: &[String],
    ) -> Result<HashMap<String, FieldGuidance>, OracleError>;

    /// Maps each field to the placeholder text exactly as it appears in the document.
    async fn resolve_placeholders(
        &self,
        document_text: &str,
        fields: &[String],
    ) -> Result<HashMap<String, String>, OracleError>;
}

/// Caps document text at `max_chars` characters, appending [`TRUNCATION_MARKER`]
/// when anything was cut.
pub fn truncate_document(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_is_untouched() {
        assert_eq!(truncate_document("Dear {{name}}", 100), "Dear {{name}}");
        assert_eq!(truncate_document("abc", 3), "abc");
    }

    #[test]
    fn test_truncate_appends_marker() {
        assert_eq!(truncate_document("abcdef", 3), "abc... [truncated]");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_document("ééééé", 2), "éé... [truncated]");
    }

    #[test]
    fn test_oracle_error_mapping_keeps_quota_distinct() {
        assert!(
            OracleError::QuotaExhausted("429".into())
                .into_extraction_error()
                .is_quota_exhausted()
        );
        assert_eq!(
            OracleError::Timeout("30s".into()).into_extraction_error(),
            DocfillError::OracleTimeout("30s".into())
        );
        assert!(matches!(
            OracleError::MalformedResponse("not json".into()).into_extraction_error(),
            DocfillError::ExtractionFailed(_)
        ));
    }
}
