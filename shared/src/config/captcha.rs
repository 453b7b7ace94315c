//! Captcha issuance policy configuration

use serde::{Deserialize, Serialize};

/// Shortest code length accepted by the policy
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest code length accepted by the policy
pub const MAX_CODE_LENGTH: usize = 10;

/// Issuance and validation policy for verification codes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptchaConfig {
    /// Number of decimal digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// TTL applied when a caller does not supply one
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,

    /// Attempt budget applied when a caller does not supply one
    #[serde(default = "default_max_attempts")]
    pub default_max_attempts: u32,

    /// Upper bound for a caller supplied TTL
    #[serde(default = "default_max_ttl_seconds")]
    pub max_ttl_seconds: u64,

    /// Upper bound for a caller supplied attempt budget
    #[serde(default = "default_max_attempts_limit")]
    pub max_attempts_limit: u32,

    /// Deadline for every backend call in milliseconds
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Log generated codes (development only)
    #[serde(default)]
    pub print_code: bool,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            default_ttl_seconds: default_ttl_seconds(),
            default_max_attempts: default_max_attempts(),
            max_ttl_seconds: default_max_ttl_seconds(),
            max_attempts_limit: default_max_attempts_limit(),
            operation_timeout_ms: default_operation_timeout_ms(),
            print_code: false,
        }
    }
}

impl CaptchaConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            code_length: env_or("CAPTCHA_CODE_LENGTH", defaults.code_length),
            default_ttl_seconds: env_or("CAPTCHA_DEFAULT_TTL_SECONDS", defaults.default_ttl_seconds),
            default_max_attempts: env_or("CAPTCHA_DEFAULT_MAX_ATTEMPTS", defaults.default_max_attempts),
            max_ttl_seconds: env_or("CAPTCHA_MAX_TTL_SECONDS", defaults.max_ttl_seconds),
            max_attempts_limit: env_or("CAPTCHA_MAX_ATTEMPTS_LIMIT", defaults.max_attempts_limit),
            operation_timeout_ms: env_or("CAPTCHA_OPERATION_TIMEOUT_MS", defaults.operation_timeout_ms),
            print_code: std::env::var("PRINT_CAPTCHA")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        }
    }

    /// Check the policy for zero or contradictory values
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.code_length) {
            return Err(format!(
                "code_length must be between {} and {}, got {}",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH, self.code_length
            ));
        }
        if self.default_ttl_seconds == 0 || self.max_ttl_seconds == 0 {
            return Err("TTL values must be positive".to_string());
        }
        if self.default_ttl_seconds > self.max_ttl_seconds {
            return Err(format!(
                "default_ttl_seconds ({}) exceeds max_ttl_seconds ({})",
                self.default_ttl_seconds, self.max_ttl_seconds
            ));
        }
        if self.default_max_attempts == 0 || self.max_attempts_limit == 0 {
            return Err("attempt budgets must be positive".to_string());
        }
        if self.default_max_attempts > self.max_attempts_limit {
            return Err(format!(
                "default_max_attempts ({}) exceeds max_attempts_limit ({})",
                self.default_max_attempts, self.max_attempts_limit
            ));
        }
        if self.operation_timeout_ms == 0 {
            return Err("operation_timeout_ms must be positive".to_string());
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_code_length() -> usize {
    6
}

fn default_ttl_seconds() -> u64 {
    300 // 5 minutes
}

fn default_max_attempts() -> u32 {
    3
}

fn default_max_ttl_seconds() -> u64 {
    3600
}

fn default_max_attempts_limit() -> u32 {
    10
}

fn default_operation_timeout_ms() -> u64 {
    2000
}
