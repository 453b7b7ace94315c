//! Configuration for the captcha service

use std::time::Duration;

use vc_shared::CaptchaConfig;

use crate::domain::value_objects::CodePolicy;
use crate::errors::{DomainError, DomainResult};

/// Configuration for the captcha service
#[derive(Debug, Clone)]
pub struct CaptchaServiceConfig {
    /// Shape of generated codes
    pub code_policy: CodePolicy,
    /// TTL used when a request does not carry one
    pub default_ttl: Duration,
    /// Attempt budget used when a request does not carry one
    pub default_max_attempts: u32,
    /// Largest TTL a caller may ask for
    pub max_ttl: Duration,
    /// Largest attempt budget a caller may ask for
    pub max_attempts_limit: u32,
    /// Deadline for every backend call
    pub operation_timeout: Duration,
    /// Prefix for rendered storage keys
    pub key_prefix: String,
    /// Log generated codes (development only)
    pub print_code: bool,
}

impl Default for CaptchaServiceConfig {
    fn default() -> Self {
        Self {
            code_policy: CodePolicy::default(),
            default_ttl: Duration::from_secs(300),
            default_max_attempts: 3,
            max_ttl: Duration::from_secs(3600),
            max_attempts_limit: 10,
            operation_timeout: Duration::from_millis(2000),
            key_prefix: "captcha".to_string(),
            print_code: false,
        }
    }
}

impl CaptchaServiceConfig {
    /// Build from the shared application configuration
    pub fn from_shared(config: &CaptchaConfig, key_prefix: impl Into<String>) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|message| DomainError::Config { message })?;

        let code_policy = CodePolicy::new(config.code_length).map_err(|e| DomainError::Config {
            message: e.to_string(),
        })?;

        Ok(Self {
            code_policy,
            default_ttl: Duration::from_secs(config.default_ttl_seconds),
            default_max_attempts: config.default_max_attempts,
            max_ttl: Duration::from_secs(config.max_ttl_seconds),
            max_attempts_limit: config.max_attempts_limit,
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
            key_prefix: key_prefix.into(),
            print_code: config.print_code,
        })
    }
}
