//! HTTP error responses.
//!
//! Every failure leaves the server as `{"error": <code>, "message": <text>}`
//! where `code` is a stable snake_case identifier clients can branch on.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docfill_core::error::DocfillError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn missing_file() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "missing_file",
            "No document file uploaded. Please upload a .docx file with field name 'document' or 'file'.",
        )
    }

    pub fn invalid_file_type() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_file_type",
            "Only .docx files are supported.",
        )
    }

    pub fn no_fields_found() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "no_fields_found",
            "No placeholders found in document. Use {{field_name}} format for placeholders.",
        )
    }

    pub fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "file_too_large",
                "Uploaded file exceeds the size limit.",
            )
        } else {
            Self::new(StatusCode::BAD_REQUEST, "invalid_request", err.body_text())
        }
    }

    pub fn from_json_rejection(_rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Invalid request body. Required: field, answer",
        )
    }
}

impl From<DocfillError> for ApiError {
    fn from(err: DocfillError) -> Self {
        match err {
            DocfillError::NotFound { entity_type, id } if entity_type == "Session" => Self::new(
                StatusCode::NOT_FOUND,
                "session_not_found",
                format!("Session '{id}' not found. Please upload a document first."),
            ),
            DocfillError::NotFound { id, .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "invalid_field",
                format!("Field '{id}' does not exist in this document."),
            ),
            DocfillError::InvalidInput(message) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
            }
            DocfillError::IncompleteState { missing } => Self::new(
                StatusCode::BAD_REQUEST,
                "incomplete_answers",
                format!(
                    "Not all fields have been answered. Missing: {}",
                    missing.join(", ")
                ),
            ),
            DocfillError::QuotaExhausted(message) => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "quota_exhausted",
                format!("AI quota exhausted, please try again later. ({message})"),
            ),
            DocfillError::OracleTimeout(message) => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                "oracle_timeout",
                format!("AI service timed out, please try again. ({message})"),
            ),
            DocfillError::ExtractionFailed(message) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "field_detection_error",
                format!("Failed to detect fields in document. Error: {message}"),
            ),
            DocfillError::GenerationFailed(message) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "document_generation_failed",
                format!("Failed to generate document: {message}"),
            ),
            err @ (DocfillError::Config(_) | DocfillError::Internal(_)) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                err.to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = self.code, status = %self.status, "Request rejected");
        }
        let body = ErrorBody {
            error: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DocfillError::session_not_found("s"), 404, "session_not_found"),
            (DocfillError::field_not_found("f"), 400, "invalid_field"),
            (DocfillError::invalid_input("x"), 400, "invalid_request"),
            (
                DocfillError::IncompleteState {
                    missing: vec!["a".into()],
                },
                400,
                "incomplete_answers",
            ),
            (DocfillError::QuotaExhausted("q".into()), 429, "quota_exhausted"),
            (DocfillError::OracleTimeout("t".into()), 504, "oracle_timeout"),
            (
                DocfillError::ExtractionFailed("e".into()),
                500,
                "field_detection_error",
            ),
            (
                DocfillError::generation_failed("g"),
                500,
                "document_generation_failed",
            ),
            (DocfillError::internal("i"), 500, "internal_error"),
            (DocfillError::config("c"), 500, "internal_error"),
        ];

        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status().as_u16(), status, "{code}");
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_incomplete_message_lists_fields() {
        let api = ApiError::from(DocfillError::IncompleteState {
            missing: vec!["amount".into(), "due_date".into()],
        });
        assert!(api.message.ends_with("amount, due_date"));
    }
}
