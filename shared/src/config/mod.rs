//! Configuration module with business-specific sub-modules
//!
//! - `cache` - Backend selection and Redis configuration
//! - `captcha` - Code length, TTL and attempt policy
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod cache;
pub mod captcha;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::{CacheConfig, CacheStrategyConfig, CacheType};
pub use captcha::CaptchaConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Cache configuration
    pub cache: CacheStrategyConfig,

    /// Captcha policy
    #[serde(default)]
    pub captcha: CaptchaConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            cache: CacheStrategyConfig::default(),
            captcha: CaptchaConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            cache: CacheStrategyConfig::from_env(),
            captcha: CaptchaConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), String> {
        self.captcha.validate()?;
        if self.environment.is_production() && self.captcha.print_code {
            return Err("PRINT_CAPTCHA must not be enabled in production".to_string());
        }
        if self.environment.is_production() && self.cache.cache_type == CacheType::Memory {
            return Err("the memory cache cannot be shared across instances; use redis in production".to_string());
        }
        Ok(())
    }
}
