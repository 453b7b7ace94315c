//! Backend contract for verification code storage.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::{CodeRecord, ConsumeOutcome};
use crate::errors::StoreError;

/// Storage backend for outstanding verification codes
///
/// Keys are fully rendered storage keys (see `VerificationKey::storage_key`).
/// `insert_if_absent` and `consume` must each be a single atomic step on the
/// backend: concurrent callers from any number of processes observe them in
/// some serial order.
///
/// # Security Considerations
/// - Implementations may store a digest of the code instead of the code;
///   `consume` receives the raw candidate either way
/// - Codes must never be logged
#[async_trait]
pub trait CaptchaCacheTrait: Send + Sync {
    /// Whether an unexpired record exists for `key`
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Store `record` with `ttl` unless a record already exists
    ///
    /// # Returns
    /// * `Ok(true)` - Record stored
    /// * `Ok(false)` - An unexpired record was already present; nothing changed
    async fn insert_if_absent(
        &self,
        key: &str,
        record: &CodeRecord,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Check `candidate` against the record and update it in one step
    ///
    /// A match deletes the record. A mismatch decrements the attempt budget and
    /// deletes the record when the budget reaches zero. The remaining TTL is
    /// left untouched.
    async fn consume(&self, key: &str, candidate: &str) -> Result<ConsumeOutcome, StoreError>;

    /// Remove the record; returns whether one was present
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Time left before the record expires, `None` when absent
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;

    /// Check backend connectivity
    async fn health_check(&self) -> Result<bool, StoreError>;

    /// Short backend name used in logs and health output
    fn backend_name(&self) -> &'static str;
}
