//! Shared utilities and common types for the verification code service
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Response envelopes
//! - Log masking helpers

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CacheStrategyConfig, CacheType, CaptchaConfig, Environment,
    LogFormat, LoggingConfig, ServerConfig,
};
pub use types::{ApiResponse, ErrorResponse, HealthResponse, HealthStatus, ServiceHealth};
pub use utils::mask_target;
