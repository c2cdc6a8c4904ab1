//! # Command Error Type
//!
//! What a failed command prints: a machine-readable code and a message.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  ShowroomApi ── ApiError::Validation ──┐                                │
//! │  argument parsing ── CoreError ────────┼──► CommandError ──► stderr     │
//! │  file read ── anyhow::Error ───────────┘     "CODE: message"            │
//! │                                              exit status 1              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use showroom_client::ApiError;
use showroom_core::CoreError;
use std::fmt;
use thiserror::Error;

/// Result type for console commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// A command failure as shown to the operator.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

/// Error codes printed before the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Not signed in, or the server rejected the token.
    Unauthorized,
    /// The signed-in role cannot do this.
    Forbidden,
    /// Form or server-side field validation failed.
    ValidationError,
    /// The backend could not be reached.
    NetworkError,
    /// The backend answered with an error status.
    HttpError,
    /// The backend's answer could not be read.
    DecodeError,
    /// Bad configuration file or environment.
    ConfigError,
    /// The session file could not be read or written.
    StorageError,
    /// A command-line value made no sense.
    InvalidArgument,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::HttpError => "HTTP_ERROR",
            ErrorCode::DecodeError => "DECODE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CommandError {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CommandError::new(ErrorCode::InvalidArgument, message)
    }

    pub fn not_signed_in() -> Self {
        CommandError::new(ErrorCode::Unauthorized, "not signed in; run `showroom login` first")
    }
}

impl From<ApiError> for CommandError {
    fn from(err: ApiError) -> Self {
        let code = match &err {
            ApiError::Network(_) => ErrorCode::NetworkError,
            ApiError::Unauthorized => ErrorCode::Unauthorized,
            ApiError::Http { .. } => ErrorCode::HttpError,
            ApiError::Validation { .. } => ErrorCode::ValidationError,
            ApiError::Decode(_) => ErrorCode::DecodeError,
            ApiError::Forbidden(_) => ErrorCode::Forbidden,
            ApiError::Config(_) => ErrorCode::ConfigError,
            ApiError::Storage(_) => ErrorCode::StorageError,
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "Internal client error");
                ErrorCode::Internal
            }
        };
        CommandError::new(code, err.user_message())
    }
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::invalid_argument(err.to_string())
    }
}

/// Local file failures, already carrying their `anyhow` context.
impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        CommandError::invalid_argument(format!("{:#}", err))
    }
}
