//! Redis-backed captcha store
//!
//! Each record is a Redis hash `{code, remain}` whose key carries the TTL.
//! `code` holds the SHA-256 digest of the secret. Issue and Consume run as
//! Lua scripts so that every read-modify-write happens in one atomic step
//! on the server, no matter how many service instances share it.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use tracing::debug;

use vc_core::domain::entities::{CodeRecord, ConsumeOutcome};
use vc_core::errors::StoreError;
use vc_core::repositories::CaptchaCacheTrait;

use super::hash_code;
use super::redis_client::RedisClient;

/// Create the record unless one exists.
///
/// KEYS[1] record key; ARGV[1] code digest, ARGV[2] attempt budget,
/// ARGV[3] TTL in milliseconds. Returns 1 when created, 0 otherwise.
static ISSUE_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return 0
end
redis.call('HSET', KEYS[1], 'code', ARGV[1], 'remain', ARGV[2])
redis.call('PEXPIRE', KEYS[1], ARGV[3])
return 1
"#,
    )
});

/// Check a candidate and update the record.
///
/// KEYS[1] record key; ARGV[1] candidate digest. Returns
/// `{-1}` absent, `{-2}` malformed, `{1, 0}` matched, `{0, remain}` mismatch.
/// HSET keeps the key's remaining TTL.
static CONSUME_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local fields = redis.call('HMGET', KEYS[1], 'code', 'remain')
local code = fields[1]
local remain = fields[2]
if not code and not remain then
    return {-1}
end
remain = tonumber(remain)
if not code or not remain then
    return {-2}
end
if remain <= 0 then
    redis.call('DEL', KEYS[1])
    return {-1}
end
if code == ARGV[1] then
    redis.call('DEL', KEYS[1])
    return {1, 0}
end
remain = remain - 1
if remain <= 0 then
    redis.call('DEL', KEYS[1])
else
    redis.call('HSET', KEYS[1], 'remain', remain)
end
return {0, remain}
"#,
    )
});

/// Captcha store on a shared Redis server
#[derive(Clone)]
pub struct RedisCaptchaCache {
    client: RedisClient,
}

impl RedisCaptchaCache {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CaptchaCacheTrait for RedisCaptchaCache {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.client.exists(key).await?)
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        record: &CodeRecord,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        let args = [
            hash_code(&record.code),
            record.remaining_attempts.to_string(),
            ttl_ms.to_string(),
        ];

        let created: i64 = self.client.invoke_script(&ISSUE_SCRIPT, &[key], &args).await?;
        debug!(created = created, ttl_ms = ttl_ms, "Issue script finished");

        Ok(created == 1)
    }

    async fn consume(&self, key: &str, candidate: &str) -> Result<ConsumeOutcome, StoreError> {
        let args = [hash_code(candidate)];

        let status: Vec<i64> = self
            .client
            .invoke_script(&CONSUME_SCRIPT, &[key], &args)
            .await?;

        decode_consume_status(&status)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.client.delete(key).await?)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let pttl = self.client.pttl(key).await?;
        match pttl {
            -2 => Ok(None),
            -1 => Err(StoreError::malformed("captcha record has no expiry")),
            ms if ms >= 0 => Ok(Some(Duration::from_millis(ms as u64))),
            other => Err(StoreError::malformed(format!("unexpected PTTL reply {}", other))),
        }
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(self.client.health_check().await?)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Translate the Consume script's status array
pub(crate) fn decode_consume_status(status: &[i64]) -> Result<ConsumeOutcome, StoreError> {
    match status {
        [-1] => Ok(ConsumeOutcome::Absent),
        [1, _] => Ok(ConsumeOutcome::Matched),
        [0, remaining] => u32::try_from(*remaining)
            .map(|remaining| ConsumeOutcome::Mismatch { remaining })
            .map_err(|_| StoreError::malformed(format!("negative attempt count {}", remaining))),
        [-2] => Err(StoreError::malformed("captcha record is missing fields")),
        other => Err(StoreError::malformed(format!(
            "unexpected consume script reply {:?}",
            other
        ))),
    }
}
