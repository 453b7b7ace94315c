//! Cache module for captcha storage
//!
//! This module provides the captcha backends: a Redis-backed store whose
//! Issue and Consume run as server-side scripts, and an in-memory store for
//! development and tests.

pub mod memory_store;
pub mod redis_client;
pub mod redis_store;

#[cfg(test)]
mod tests;

use sha2::{Digest, Sha256};

pub use memory_store::MemoryCaptchaCache;
pub use redis_client::RedisClient;
pub use redis_store::RedisCaptchaCache;

// Re-export commonly used types
pub use vc_shared::config::cache::CacheConfig;

/// Hash a code for storage so secrets are never kept in plaintext
pub(crate) fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}
