//! Text completion backends and the HTTP error handling they share.

use async_trait::async_trait;
use docfill_core::oracle::OracleError;
use reqwest::StatusCode;
use serde::Deserialize;

/// A provider that turns a system instruction plus a prompt into text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Model identifier sent to the provider.
    fn model(&self) -> &str;

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, OracleError>;
}

/// Substrings that mark a provider response as a rate or quota limit.
const QUOTA_KEYWORDS: &[&str] = &[
    "quota",
    "resource_exhausted",
    "rate limit",
    "rate_limit",
    "quota exceeded",
    "quota_exceeded",
];

/// True for HTTP 429 or any error body mentioning a quota keyword.
///
/// Matching is case-insensitive and covers the JSON `error.message` and
/// `error.status` fields, since both are part of the raw body.
pub fn is_quota_error(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    let lower = body.to_lowercase();
    QUOTA_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Maps a non-success response into an [`OracleError`].
pub(crate) fn map_http_error(provider: &str, status: StatusCode, body: String) -> OracleError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    if is_quota_error(status, &body) {
        return OracleError::QuotaExhausted(format!("{provider}: {message}"));
    }
    if status == StatusCode::GATEWAY_TIMEOUT || status == StatusCode::REQUEST_TIMEOUT {
        return OracleError::Timeout(format!("{provider}: {message}"));
    }
    OracleError::Request {
        status: status.as_u16(),
        message: format!("{provider}: {message}"),
    }
}

/// Maps a transport failure into an [`OracleError`].
pub(crate) fn map_transport_error(provider: &str, err: reqwest::Error) -> OracleError {
    // Strip the URL: the Gemini key travels as a query parameter.
    let err = err.without_url();
    if err.is_timeout() {
        OracleError::Timeout(format!("{provider} request timed out"))
    } else {
        OracleError::Unavailable(format!("{provider} request failed: {err}"))
    }
}

pub(crate) fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client, OracleError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| OracleError::NotConfigured(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_detection() {
        assert!(is_quota_error(StatusCode::TOO_MANY_REQUESTS, ""));
        assert!(is_quota_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"status":"RESOURCE_EXHAUSTED","message":"..."}}"#
        ));
        assert!(is_quota_error(StatusCode::FORBIDDEN, "Rate Limit reached"));
        assert!(!is_quota_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"));
    }

    #[test]
    fn test_map_http_error_prefers_structured_message() {
        let err = map_http_error(
            "gemini",
            StatusCode::BAD_REQUEST,
            r#"{"error":{"status":"INVALID_ARGUMENT","message":"bad model"}}"#.to_string(),
        );
        assert_eq!(
            err,
            OracleError::Request {
                status: 400,
                message: "gemini: INVALID_ARGUMENT: bad model".to_string()
            }
        );
    }

    #[test]
    fn test_map_http_error_quota_and_timeout() {
        assert!(
            map_http_error("openai", StatusCode::TOO_MANY_REQUESTS, "slow down".into())
                .is_quota_exhausted()
        );
        assert!(matches!(
            map_http_error("openai", StatusCode::GATEWAY_TIMEOUT, "upstream".into()),
            OracleError::Timeout(_)
        ));
    }
}
