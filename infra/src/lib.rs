//! # Infrastructure Layer
//!
//! Concrete captcha backends for the verification code service.
//!
//! ## Architecture
//!
//! - **Cache**: Redis client, Redis-backed atomic captcha store, and an
//!   in-memory store for development
//! - **Factory**: [`build_captcha_cache`] picks a backend from configuration

use std::sync::Arc;

use vc_core::errors::StoreError;
use vc_core::repositories::CaptchaCacheTrait;
use vc_shared::config::cache::{CacheStrategyConfig, CacheType};

// Re-export core types for convenience
pub use vc_core::errors::*;

/// Cache module - Redis client and captcha stores
pub mod cache;

use cache::{MemoryCaptchaCache, RedisCaptchaCache, RedisClient};

/// Build the captcha backend selected by `config`
///
/// Connects to Redis (with retry) when the Redis backend is selected.
pub async fn build_captcha_cache(
    config: &CacheStrategyConfig,
) -> Result<Arc<dyn CaptchaCacheTrait>, InfrastructureError> {
    match config.cache_type {
        CacheType::Redis => {
            let client = RedisClient::new(&config.redis).await?;
            tracing::info!(backend = "redis", "Captcha backend initialized");
            Ok(Arc::new(RedisCaptchaCache::new(client)))
        }
        CacheType::Memory => {
            tracing::warn!(
                backend = "memory",
                "Captcha backend is process-local; do not run more than one instance"
            );
            Ok(Arc::new(MemoryCaptchaCache::new()))
        }
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Cache(e) if e.kind() == redis::ErrorKind::TypeError => {
                StoreError::malformed(e.to_string())
            }
            other => StoreError::unavailable(other.to_string()),
        }
    }
}
