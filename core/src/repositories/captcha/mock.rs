//! Mock implementation of CaptchaCacheTrait for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::entities::{CodeRecord, ConsumeOutcome};
use crate::errors::StoreError;

use super::r#trait::CaptchaCacheTrait;

/// In-process mock backend with failure and latency injection
///
/// Deadlines use `tokio::time::Instant` so tests can drive expiry with a
/// paused clock.
pub struct MockCaptchaCache {
    records: Arc<Mutex<HashMap<String, (CodeRecord, Instant)>>>,
    should_fail: AtomicBool,
    latency_ms: AtomicU64,
    consume_calls: AtomicUsize,
}

impl MockCaptchaCache {
    /// Create a new mock backend
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            should_fail: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0),
            consume_calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Delay every subsequent call
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `consume` calls that reached the backend
    pub fn consume_calls(&self) -> usize {
        self.consume_calls.load(Ordering::SeqCst)
    }

    /// Raw stored record, bypassing expiry
    pub async fn stored(&self, key: &str) -> Option<CodeRecord> {
        self.records.lock().await.get(key).map(|(r, _)| r.clone())
    }

    async fn enter(&self) -> Result<(), StoreError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("mock backend failure"));
        }
        Ok(())
    }

    fn live<'a>(
        records: &'a mut HashMap<String, (CodeRecord, Instant)>,
        key: &str,
    ) -> Option<&'a mut (CodeRecord, Instant)> {
        let expired = matches!(records.get(key), Some((_, deadline)) if *deadline <= Instant::now());
        if expired {
            records.remove(key);
        }
        records.get_mut(key)
    }
}

impl Default for MockCaptchaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptchaCacheTrait for MockCaptchaCache {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.enter().await?;
        let mut records = self.records.lock().await;
        Ok(Self::live(&mut records, key).is_some())
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        record: &CodeRecord,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.enter().await?;
        let mut records = self.records.lock().await;
        if Self::live(&mut records, key).is_some() {
            return Ok(false);
        }
        records.insert(key.to_string(), (record.clone(), Instant::now() + ttl));
        Ok(true)
    }

    async fn consume(&self, key: &str, candidate: &str) -> Result<ConsumeOutcome, StoreError> {
        self.enter().await?;
        self.consume_calls.fetch_add(1, Ordering::SeqCst);

        let mut records = self.records.lock().await;
        let outcome = match Self::live(&mut records, key) {
            Some((record, _)) => record.register_attempt(candidate),
            None => return Ok(ConsumeOutcome::Absent),
        };
        if outcome.removes_record() {
            records.remove(key);
        }
        Ok(outcome)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.enter().await?;
        let mut records = self.records.lock().await;
        let present = Self::live(&mut records, key).is_some();
        records.remove(key);
        Ok(present)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        self.enter().await?;
        let mut records = self.records.lock().await;
        Ok(Self::live(&mut records, key).map(|(_, deadline)| deadline.saturating_duration_since(Instant::now())))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        self.enter().await?;
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
