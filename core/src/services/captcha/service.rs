//! Main captcha service implementation

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use vc_shared::config::captcha::MAX_CODE_LENGTH;

use crate::domain::entities::{CodeRecord, ConsumeOutcome, IssuedCode};
use crate::domain::value_objects::VerificationKey;
use crate::errors::{CaptchaError, DomainError, DomainResult, StoreError, ValidationError};
use crate::repositories::CaptchaCacheTrait;

use super::config::CaptchaServiceConfig;
use super::types::{GenerateCodeRequest, GenerateCodeResult, ValidateCodeRequest, ValidateCodeResult};

/// Captcha service: Issue, Consume, Exists and Delete over a shared backend
///
/// The service holds no per-key state. Correctness under concurrency comes
/// from the backend executing `insert_if_absent` and `consume` atomically, so
/// any number of service instances may share one backend.
pub struct CaptchaService<C: CaptchaCacheTrait + ?Sized> {
    /// Backend storing outstanding codes
    cache: Arc<C>,
    /// Service configuration
    config: CaptchaServiceConfig,
}

impl<C: CaptchaCacheTrait + ?Sized> CaptchaService<C> {
    /// Create a new captcha service
    ///
    /// # Arguments
    ///
    /// * `cache` - Backend implementation
    /// * `config` - Service configuration
    pub fn new(cache: Arc<C>, config: CaptchaServiceConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> &CaptchaServiceConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Whether `key` currently has an outstanding code
    pub async fn exists(&self, key: &VerificationKey) -> DomainResult<bool> {
        let storage_key = self.storage_key(key);
        self.guarded("exists", self.cache.exists(&storage_key)).await
    }

    /// Issue a new code for `key`
    ///
    /// Check-and-create is a single backend step: of several concurrent
    /// callers exactly one succeeds and the rest get `AlreadyActive`.
    ///
    /// # Arguments
    ///
    /// * `key` - Identity the code is bound to
    /// * `ttl` - Lifetime, between 1ms and the configured maximum
    /// * `max_attempts` - Attempt budget, between 1 and the configured limit
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedCode)` - The new code, to be handed to the delivery channel
    /// * `Err(DomainError::Captcha(AlreadyActive))` - A code is outstanding
    /// * `Err(DomainError::Store(_))` - Backend failure or timeout
    pub async fn issue(
        &self,
        key: &VerificationKey,
        ttl: Duration,
        max_attempts: u32,
    ) -> DomainResult<IssuedCode> {
        self.check_ttl(ttl)?;
        self.check_max_attempts(max_attempts)?;

        let storage_key = self.storage_key(key);
        let code = self.config.code_policy.generate();
        let record = CodeRecord::new(code.clone(), max_attempts);

        let inserted = self
            .guarded("issue", self.cache.insert_if_absent(&storage_key, &record, ttl))
            .await?;

        if !inserted {
            tracing::info!(
                namespace = key.namespace(),
                biz_type = key.biz_type(),
                recipient = %key.masked_target(),
                event = "captcha_already_active",
                "Captcha already active for key"
            );
            return Err(CaptchaError::AlreadyActive.into());
        }

        tracing::info!(
            namespace = key.namespace(),
            biz_type = key.biz_type(),
            recipient = %key.masked_target(),
            ttl_ms = ttl.as_millis() as u64,
            max_attempts = max_attempts,
            backend = self.cache.backend_name(),
            event = "captcha_issued",
            "Issued new captcha"
        );

        if self.config.print_code {
            tracing::info!(
                recipient = %key.masked_target(),
                code = %code,
                event = "captcha_printed",
                "Generated captcha"
            );
        }

        Ok(IssuedCode {
            key: key.clone(),
            code,
            ttl,
            max_attempts,
        })
    }

    /// Consume one attempt against the code for `key`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Candidate matched; the code is gone
    /// * `Err(DomainError::Captcha(WrongCode { remaining }))` - Mismatch
    /// * `Err(DomainError::Captcha(NotFound))` - Never issued, expired or exhausted
    /// * `Err(DomainError::Store(_))` - Backend failure or timeout. The attempt
    ///   may or may not have been applied and must not be read as a mismatch.
    pub async fn consume(&self, key: &VerificationKey, candidate: &str) -> DomainResult<()> {
        let candidate = Self::check_candidate(candidate)?;
        let storage_key = self.storage_key(key);

        let outcome = self
            .guarded("consume", self.cache.consume(&storage_key, candidate))
            .await?;

        match outcome {
            ConsumeOutcome::Matched => {
                tracing::info!(
                    namespace = key.namespace(),
                    biz_type = key.biz_type(),
                    recipient = %key.masked_target(),
                    event = "captcha_verified",
                    "Captcha verified"
                );
                Ok(())
            }
            ConsumeOutcome::Mismatch { remaining } => {
                tracing::warn!(
                    namespace = key.namespace(),
                    biz_type = key.biz_type(),
                    recipient = %key.masked_target(),
                    remaining_attempts = remaining,
                    event = "captcha_mismatch",
                    "Wrong captcha submitted"
                );
                Err(CaptchaError::WrongCode { remaining }.into())
            }
            ConsumeOutcome::Absent => {
                tracing::debug!(
                    namespace = key.namespace(),
                    biz_type = key.biz_type(),
                    recipient = %key.masked_target(),
                    event = "captcha_not_found",
                    "No active captcha for key"
                );
                Err(CaptchaError::NotFound.into())
            }
        }
    }

    /// Revoke the code for `key`; returns whether one was outstanding
    pub async fn delete(&self, key: &VerificationKey) -> DomainResult<bool> {
        let storage_key = self.storage_key(key);
        let removed = self.guarded("delete", self.cache.delete(&storage_key)).await?;

        if removed {
            tracing::info!(
                namespace = key.namespace(),
                biz_type = key.biz_type(),
                recipient = %key.masked_target(),
                event = "captcha_revoked",
                "Captcha revoked"
            );
        }

        Ok(removed)
    }

    /// Whole seconds left on the code for `key`, rounded up
    pub async fn remaining_ttl(&self, key: &VerificationKey) -> DomainResult<Option<u64>> {
        let storage_key = self.storage_key(key);
        let ttl = self.guarded("ttl", self.cache.ttl(&storage_key)).await?;

        Ok(ttl.map(|d| {
            let secs = d.as_secs();
            if d.subsec_nanos() > 0 {
                secs + 1
            } else {
                secs
            }
        }))
    }

    /// Backend connectivity
    pub async fn health_check(&self) -> DomainResult<bool> {
        self.guarded("health_check", self.cache.health_check()).await
    }

    /// Issue a code from raw request fields, applying configured defaults
    pub async fn generate_code(&self, request: &GenerateCodeRequest) -> DomainResult<GenerateCodeResult> {
        let key = VerificationKey::new(&request.namespace, &request.biz_type, &request.target)?;

        let ttl = match request.ttl_seconds {
            Some(secs) => Duration::from_secs(secs),
            None => self.config.default_ttl,
        };
        let max_attempts = request
            .max_attempts
            .unwrap_or(self.config.default_max_attempts);

        let issued = self.issue(&key, ttl, max_attempts).await?;
        let expires_at = Utc::now()
            + chrono::Duration::from_std(issued.ttl).unwrap_or_else(|_| chrono::Duration::zero());

        Ok(GenerateCodeResult { issued, expires_at })
    }

    /// Validate a candidate from raw request fields
    ///
    /// Business outcomes come back as a `ValidateCodeResult`; only bad input
    /// and backend failures are errors, so a transient failure is never
    /// reported as `valid == false`.
    pub async fn validate_code(&self, request: &ValidateCodeRequest) -> DomainResult<ValidateCodeResult> {
        let key = VerificationKey::new(&request.namespace, &request.biz_type, &request.target)?;

        match self.consume(&key, &request.captcha).await {
            Ok(()) => Ok(ValidateCodeResult::valid()),
            Err(DomainError::Captcha(CaptchaError::NotFound)) => Ok(ValidateCodeResult::not_found()),
            Err(DomainError::Captcha(CaptchaError::WrongCode { remaining })) => {
                Ok(ValidateCodeResult::wrong_code(remaining))
            }
            Err(e) => Err(e),
        }
    }

    fn storage_key(&self, key: &VerificationKey) -> String {
        key.storage_key(&self.config.key_prefix)
    }

    /// Run a backend call under the operation deadline
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let result = match tokio::time::timeout(self.config.operation_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                operation,
                elapsed_ms: self.config.operation_timeout.as_millis() as u64,
            }),
        };

        result.map_err(|e| {
            tracing::error!(
                operation = operation,
                backend = self.cache.backend_name(),
                error = %e,
                event = "captcha_store_error",
                "Captcha backend call failed"
            );
            DomainError::Store(e)
        })
    }

    fn check_ttl(&self, ttl: Duration) -> DomainResult<()> {
        if ttl.as_millis() == 0 || ttl > self.config.max_ttl {
            return Err(ValidationError::OutOfRange {
                field: "ttl_seconds".to_string(),
                min: 1,
                max: self.config.max_ttl.as_secs(),
                actual: ttl.as_secs(),
            }
            .into());
        }
        Ok(())
    }

    fn check_max_attempts(&self, max_attempts: u32) -> DomainResult<()> {
        if max_attempts == 0 || max_attempts > self.config.max_attempts_limit {
            return Err(ValidationError::OutOfRange {
                field: "max_attempts".to_string(),
                min: 1,
                max: self.config.max_attempts_limit as u64,
                actual: max_attempts as u64,
            }
            .into());
        }
        Ok(())
    }

    // Malformed candidates are refused before they can spend an attempt.
    fn check_candidate(candidate: &str) -> DomainResult<&str> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "captcha".to_string(),
            }
            .into());
        }
        if candidate.len() > MAX_CODE_LENGTH {
            return Err(ValidationError::InvalidLength {
                field: "captcha".to_string(),
                max: MAX_CODE_LENGTH,
                actual: candidate.len(),
            }
            .into());
        }
        Ok(candidate)
    }
}
