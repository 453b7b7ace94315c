//! Domain-specific error types and error handling.

mod types;


pub use types::{CaptchaError, StoreError, ValidationError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Captcha(#[from] CaptchaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Whether the failure is a transient backend condition
    ///
    /// Business outcomes and bad input are never transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Store(_))
    }

    /// Stable machine-readable code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Config { .. } => "configuration_error",
            DomainError::Captcha(CaptchaError::AlreadyActive) => "captcha_already_active",
            DomainError::Captcha(CaptchaError::NotFound) => "captcha_not_found",
            DomainError::Captcha(CaptchaError::WrongCode { .. }) => "captcha_wrong_code",
            DomainError::Store(StoreError::Timeout { .. }) => "store_timeout",
            DomainError::Store(_) => "store_error",
            DomainError::ValidationErr(_) => "validation_error",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
