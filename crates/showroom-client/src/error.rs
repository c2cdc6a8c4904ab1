//! # Client Error Types
//!
//! Errors surfaced by the data layer to the view.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Error Categories                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │  Server reply   │  │     Local               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Network        │  │  Unauthorized   │  │  Forbidden (role gate)  │ │
//! │  │  (no response)  │  │  Http           │  │  Config                 │ │
//! │  │                 │  │  Validation     │  │  Storage                │ │
//! │  │                 │  │  Decode         │  │  Internal               │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Unauthorized is handled at the transport: the session is cleared       │
//! │  before the error reaches the caller.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ApiError` is `Clone`: one coalesced fetch delivers the same error to
//! every waiting reader.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// One field-level failure from a 422 response.
///
/// The backend reports `{"detail": [{"loc": ["body", "name"], "msg": "...", "type": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<Value>,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl FieldError {
    /// Name of the offending field: the last `loc` segment.
    pub fn field(&self) -> String {
        match self.loc.last() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "request".to_string(),
        }
    }
}

/// Errors returned by reads and writes.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response (DNS, refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    // =========================================================================
    // Server Errors
    // =========================================================================
    /// 401 from any endpoint. The session has already been cleared.
    #[error("Unauthorized: please sign in again")]
    Unauthorized,

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// 4xx carrying structured field errors.
    #[error("Validation failed: {}", summarize(.fields))]
    Validation { status: u16, fields: Vec<FieldError> },

    /// A success response whose body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// The signed-in role cannot perform this action.
    #[error("Not permitted: your role cannot {0}")]
    Forbidden(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The persisted session could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Invariant violation inside the data layer.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field(), f.msg))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    /// Classifies a non-success response.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }

        let text = String::from_utf8_lossy(body).into_owned();
        if (400..500).contains(&status) {
            if let Ok(parsed) = serde_json::from_slice::<Value>(body) {
                if let Some(detail @ Value::Array(_)) = parsed.get("detail") {
                    if let Ok(fields) = serde_json::from_value::<Vec<FieldError>>(detail.clone()) {
                        return ApiError::Validation { status, fields };
                    }
                }
            }
        }

        ApiError::Http { status, body: text }
    }

    /// HTTP status behind this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Http { status, .. } | ApiError::Validation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Plain-text message for the operator.
    ///
    /// Prefers the backend's `{"detail": "..."}` string when there is one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { status, body } => serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| format!("Request failed with status {}", status)),
            other => other.to_string(),
        }
    }

    // =========================================================================
    // Error Categorization
    // =========================================================================

    /// Only transport failures are worth retrying; the server's answers are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::Forbidden(_))
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, ApiError::Config(_))
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::Internal(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::Config(format!("invalid URL: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for ApiError {
    fn from(err: toml::de::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ApiError {
    fn from(err: toml::ser::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl From<showroom_core::ValidationError> for ApiError {
    fn from(err: showroom_core::ValidationError) -> Self {
        let field = match &err {
            showroom_core::ValidationError::Required { field }
            | showroom_core::ValidationError::TooLong { field, .. }
            | showroom_core::ValidationError::OutOfRange { field, .. }
            | showroom_core::ValidationError::MustBeNonNegative { field }
            | showroom_core::ValidationError::MustBeNonZero { field }
            | showroom_core::ValidationError::InvalidFormat { field, .. }
            | showroom_core::ValidationError::NotAllowed { field, .. } => field.clone(),
        };
        ApiError::Validation {
            status: 0,
            fields: vec![FieldError {
                loc: vec![Value::String(field)],
                msg: err.to_string(),
                kind: "client".to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ApiError::Network("connection refused".into()).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::Http { status: 503, body: String::new() }.is_retryable());
        assert!(!ApiError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn test_from_response_401() {
        assert!(matches!(ApiError::from_response(401, b"{}"), ApiError::Unauthorized));
    }

    #[test]
    fn test_from_response_structured_validation() {
        let body = br#"{"detail":[{"loc":["body","name"],"msg":"field required","type":"value_error.missing"}]}"#;
        match ApiError::from_response(422, body) {
            ApiError::Validation { status, fields } => {
                assert_eq!(status, 422);
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field(), "name");
                assert_eq!(fields[0].kind, "value_error.missing");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_response_plain_detail() {
        let err = ApiError::from_response(400, br#"{"detail":"Stock cannot go negative"}"#);
        assert!(matches!(err, ApiError::Http { status: 400, .. }));
        assert_eq!(err.user_message(), "Stock cannot go negative");

        let err = ApiError::from_response(500, b"boom");
        assert_eq!(err.user_message(), "Request failed with status 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_core_validation_converts() {
        let err: ApiError = showroom_core::ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(err.to_string().contains("name: name is required"));
    }
}
