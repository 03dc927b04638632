//! Error types for the Docfill application.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Docfill application.
///
/// The variants follow the failure taxonomy the HTTP boundary reports to
/// clients. `QuotaExhausted` and `OracleTimeout` are kept apart from
/// `ExtractionFailed` so callers can suggest retrying later instead of
/// treating the failure as permanent.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DocfillError {
    /// A session or a field within a session does not exist
    #[error("{entity_type} not found: '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Malformed upload, wrong extension or missing request fields
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Placeholder detection failed
    #[error("Field extraction failed: {0}")]
    ExtractionFailed(String),

    /// The semantic oracle reported a rate or quota limit
    #[error("Oracle quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The semantic oracle did not answer within the request timeout
    #[error("Oracle timed out: {0}")]
    OracleTimeout(String),

    /// The filled document could not be produced, even after fallback
    #[error("Document generation failed: {0}")]
    GenerationFailed(String),

    /// Document generation was requested before every field was answered
    #[error("Not all fields have been answered. Missing: {missing:?}")]
    IncompleteState { missing: Vec<String> },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocfillError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error for a session ID
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Session",
            id: id.into(),
        }
    }

    /// Creates a NotFound error for a field identifier
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Field",
            id: field.into(),
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a GenerationFailed error
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error for a session
    pub fn is_session_not_found(&self) -> bool {
        matches!(self, Self::NotFound { entity_type, .. } if *entity_type == "Session")
    }

    /// Check if this is a NotFound error for a field
    pub fn is_field_not_found(&self) -> bool {
        matches!(self, Self::NotFound { entity_type, .. } if *entity_type == "Field")
    }

    /// Check if this is a quota error
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted(_))
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns true when retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QuotaExhausted(_) | Self::OracleTimeout(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DocfillError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for DocfillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for DocfillError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML error: {err}"))
    }
}

/// Conversion from anyhow::Error (composition root only)
impl From<anyhow::Error> for DocfillError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, DocfillError>`.
pub type Result<T> = std::result::Result<T, DocfillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicates() {
        let session = DocfillError::session_not_found("abc");
        let field = DocfillError::field_not_found("client_name");

        assert!(session.is_session_not_found());
        assert!(!session.is_field_not_found());
        assert!(field.is_field_not_found());
        assert_eq!(field.to_string(), "Field not found: 'client_name'");
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(DocfillError::QuotaExhausted("429".into()).is_retryable());
        assert!(DocfillError::OracleTimeout("30s".into()).is_retryable());
        assert!(!DocfillError::ExtractionFailed("bad json".into()).is_retryable());
    }

    #[test]
    fn test_incomplete_state_message_lists_missing_fields() {
        let err = DocfillError::IncompleteState {
            missing: vec!["amount".to_string(), "date".to_string()],
        };
        assert_eq!(
            err.to_string(),
            r#"Not all fields have been answered. Missing: ["amount", "date"]"#
        );
    }
}
