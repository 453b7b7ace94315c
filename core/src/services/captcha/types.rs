//! Request and result types for the captcha service

use chrono::{DateTime, Utc};

use crate::domain::entities::IssuedCode;

/// Request to issue a code
#[derive(Debug, Clone, Default)]
pub struct GenerateCodeRequest {
    pub namespace: String,
    pub biz_type: String,
    pub target: String,
    /// Falls back to the configured default when absent
    pub ttl_seconds: Option<u64>,
    /// Falls back to the configured default when absent
    pub max_attempts: Option<u32>,
}

/// Result of issuing a code
#[derive(Debug, Clone)]
pub struct GenerateCodeResult {
    /// The issued code, for the delivery channel only
    pub issued: IssuedCode,
    /// Wall-clock expiry, for display
    pub expires_at: DateTime<Utc>,
}

/// Request to validate a candidate code
#[derive(Debug, Clone, Default)]
pub struct ValidateCodeRequest {
    pub namespace: String,
    pub biz_type: String,
    pub target: String,
    pub captcha: String,
}

/// Result of validating a candidate code
///
/// Backend failures are never represented here; they surface as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateCodeResult {
    /// Whether the candidate matched
    pub valid: bool,
    /// Human-readable outcome
    pub message: String,
    /// Attempts left after a mismatch
    pub remaining_attempts: Option<u32>,
}

impl ValidateCodeResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: "Captcha verified".to_string(),
            remaining_attempts: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            valid: false,
            message: "Captcha not found or expired".to_string(),
            remaining_attempts: None,
        }
    }

    pub fn wrong_code(remaining: u32) -> Self {
        let message = if remaining == 0 {
            "Wrong captcha, no attempts remaining, the captcha has been revoked".to_string()
        } else {
            format!("Wrong captcha, {} attempts remaining", remaining)
        };

        Self {
            valid: false,
            message,
            remaining_attempts: Some(remaining),
        }
    }
}
