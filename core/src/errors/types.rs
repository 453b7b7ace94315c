//! Error types for captcha issuance, consumption and backend access
//!
//! Business outcomes (`CaptchaError`) are expected results and are returned as
//! typed values. Only `StoreError` represents an unexpected condition.

use thiserror::Error;

/// Business-rule outcomes of Issue and Consume
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptchaError {
    /// Issue was called while a code is still outstanding for the key
    #[error("A captcha was already sent, please wait before requesting another")]
    AlreadyActive,

    /// Never issued, expired, or exhausted; deliberately not distinguished
    #[error("Captcha not found or expired")]
    NotFound,

    /// Candidate did not match; `remaining` attempts are left after this one
    #[error("Wrong captcha, {remaining} attempts remaining")]
    WrongCode { remaining: u32 },
}

/// Backend failures
///
/// Never converted into `CaptchaError::NotFound` or `valid = false`: a
/// timed-out Consume may have mutated the record server-side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Captcha backend unavailable: {message}")]
    Unavailable { message: String },

    #[error("Captcha backend {operation} timed out after {elapsed_ms}ms")]
    Timeout {
        operation: &'static str,
        elapsed_ms: u64,
    },

    #[error("Malformed captcha record: {message}")]
    MalformedRecord { message: String },
}

impl StoreError {
    /// Shorthand for an unavailable backend
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    /// Shorthand for a record that could not be decoded
    pub fn malformed(message: impl Into<String>) -> Self {
        StoreError::MalformedRecord {
            message: message.into(),
        }
    }
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid format for field: {field} ({reason})")]
    InvalidFormat { field: String, reason: String },

    #[error("Invalid length for field: {field} (max: {max}, actual: {actual})")]
    InvalidLength {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Value out of range for field: {field} (min: {min}, max: {max}, actual: {actual})")]
    OutOfRange {
        field: String,
        min: u64,
        max: u64,
        actual: u64,
    },
}
