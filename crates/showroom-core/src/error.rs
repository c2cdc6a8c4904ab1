//! # Error Types
//!
//! Domain-specific error types for showroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  showroom-core errors (this file)                                      │
//! │  ├── CoreError        - Parsing and domain rule failures               │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  showroom-client errors (separate crate)                               │
//! │  └── ApiError         - Network / HTTP / session failures              │
//! │                                                                         │
//! │  console errors (app)                                                  │
//! │  └── CommandError     - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → CommandError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A decimal amount could not be parsed.
    ///
    /// Only surfaced by the strict parser. Aggregation uses
    /// [`crate::money::Money::parse_or_zero`] and never sees this.
    #[error("Invalid decimal amount: '{0}'")]
    InvalidDecimal(String),

    /// The role string is not one the backend issues.
    #[error("Unknown user role: {0}")]
    UnknownRole(String),

    /// The payment mode string is not CASH, IP or FINANCE.
    #[error("Unknown payment mode: {0}")]
    UnknownPaymentMode(String),

    /// Transfer status outside the backend's lifecycle.
    #[error("Unknown transfer status: {0}")]
    UnknownTransferStatus(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors raised before a write request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Invalid format (e.g., malformed amount or date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
