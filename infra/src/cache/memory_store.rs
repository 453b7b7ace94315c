//! Process-local captcha store
//!
//! Suitable for development and single-instance tests only: records live in
//! one process, so several service instances would not see each other's
//! codes. Atomicity comes from holding one lock across each operation.
//!
//! Expired records are dropped when touched. The full sweep only runs once
//! the map reaches a threshold, which then doubles relative to the surviving
//! entries, so inserts stay amortized O(1).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use vc_core::domain::entities::{CodeRecord, ConsumeOutcome};
use vc_core::errors::StoreError;
use vc_core::repositories::CaptchaCacheTrait;

use super::hash_code;

/// Stored record with its expiry deadline
#[derive(Debug, Clone)]
struct Entry {
    record: CodeRecord,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Map size at which the first full sweep runs
pub const DEFAULT_PURGE_THRESHOLD: usize = 1024;

struct Store {
    entries: HashMap<String, Entry>,
    purge_at: usize,
    min_purge_at: usize,
}

impl Store {
    fn purge_if_due(&mut self, now: Instant) {
        if self.entries.len() < self.purge_at {
            return;
        }

        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        self.purge_at = self.min_purge_at.max(self.entries.len() * 2);

        debug!(
            purged = before - self.entries.len(),
            next_purge_at = self.purge_at,
            "Purged expired captcha records"
        );
    }
}

/// In-memory captcha store with lazy expiry
pub struct MemoryCaptchaCache {
    store: Mutex<Store>,
}

impl Default for MemoryCaptchaCache {
    fn default() -> Self {
        Self::with_purge_threshold(DEFAULT_PURGE_THRESHOLD)
    }
}

impl MemoryCaptchaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_purge_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            store: Mutex::new(Store {
                entries: HashMap::new(),
                purge_at: threshold,
                min_purge_at: threshold,
            }),
        }
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.store.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) async fn stored_code(&self, key: &str) -> Option<String> {
        self.store.lock().await.entries.get(key).map(|e| e.record.code.clone())
    }

    /// Get the live entry for `key`, dropping it first if it has expired
    fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str, now: Instant) -> Option<&'a mut Entry> {
        if entries.get(key).map_or(false, |e| e.is_expired(now)) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }
}

#[async_trait]
impl CaptchaCacheTrait for MemoryCaptchaCache {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut store = self.store.lock().await;
        Ok(Self::live(&mut store.entries, key, Instant::now()).is_some())
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        record: &CodeRecord,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut store = self.store.lock().await;

        if Self::live(&mut store.entries, key, now).is_some() {
            return Ok(false);
        }

        store.purge_if_due(now);
        store.entries.insert(
            key.to_string(),
            Entry {
                record: CodeRecord::new(hash_code(&record.code), record.remaining_attempts),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn consume(&self, key: &str, candidate: &str) -> Result<ConsumeOutcome, StoreError> {
        let digest = hash_code(candidate);
        let mut store = self.store.lock().await;

        let outcome = match Self::live(&mut store.entries, key, Instant::now()) {
            Some(entry) => entry.record.register_attempt(&digest),
            None => return Ok(ConsumeOutcome::Absent),
        };

        if outcome.removes_record() {
            store.entries.remove(key);
        }
        Ok(outcome)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut store = self.store.lock().await;
        let present = Self::live(&mut store.entries, key, Instant::now()).is_some();
        store.entries.remove(key);
        Ok(present)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = Instant::now();
        let mut store = self.store.lock().await;
        Ok(Self::live(&mut store.entries, key, now).map(|e| e.expires_at.saturating_duration_since(now)))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
