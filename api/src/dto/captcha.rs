use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use vc_core::services::{GenerateCodeRequest, ValidateCodeRequest, ValidateCodeResult};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateCaptchaRequest {
    /// Calling service, e.g. "user-account-service"
    #[validate(length(min = 1, max = 128))]
    pub namespace: String,

    /// Business purpose, e.g. "login" or "register"
    #[validate(length(min = 1, max = 128))]
    pub biz_type: String,

    /// Phone number or email the code is bound to
    #[validate(length(min = 1, max = 128))]
    pub target: String,

    /// Lifetime in seconds; server default when omitted
    #[serde(default)]
    #[validate(range(min = 1))]
    pub ttl_seconds: Option<u64>,

    /// Attempt budget; server default when omitted
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_attempts: Option<u32>,
}

impl From<GenerateCaptchaRequest> for GenerateCodeRequest {
    fn from(request: GenerateCaptchaRequest) -> Self {
        Self {
            namespace: request.namespace,
            biz_type: request.biz_type,
            target: request.target,
            ttl_seconds: request.ttl_seconds,
            max_attempts: request.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCaptchaResponse {
    pub message: String,
    pub ttl_seconds: u64,
    pub max_attempts: u32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ValidateCaptchaRequest {
    #[validate(length(min = 1, max = 128))]
    pub namespace: String,

    #[validate(length(min = 1, max = 128))]
    pub biz_type: String,

    #[validate(length(min = 1, max = 128))]
    pub target: String,

    /// Candidate code as typed by the user
    ///
    /// Only bounds the payload; the service trims and checks the code length.
    #[validate(length(min = 1, max = 64))]
    pub captcha: String,
}

impl From<ValidateCaptchaRequest> for ValidateCodeRequest {
    fn from(request: ValidateCaptchaRequest) -> Self {
        Self {
            namespace: request.namespace,
            biz_type: request.biz_type,
            target: request.target,
            captcha: request.captcha,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateCaptchaResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

impl From<ValidateCodeResult> for ValidateCaptchaResponse {
    fn from(result: ValidateCodeResult) -> Self {
        Self {
            valid: result.valid,
            message: result.message,
            remaining_attempts: result.remaining_attempts,
        }
    }
}

/// Body shared by the exists and revoke endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CaptchaKeyRequest {
    #[validate(length(min = 1, max = 128))]
    pub namespace: String,

    #[validate(length(min = 1, max = 128))]
    pub biz_type: String,

    #[validate(length(min = 1, max = 128))]
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsCaptchaResponse {
    pub active: bool,
    /// Seconds until the active code expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeCaptchaResponse {
    pub revoked: bool,
}
