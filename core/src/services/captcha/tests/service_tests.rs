//! Unit tests for the captcha service

use std::sync::Arc;
use std::time::Duration;

use vc_shared::CaptchaConfig;

use crate::domain::value_objects::VerificationKey;
use crate::errors::{CaptchaError, DomainError, StoreError, ValidationError};
use crate::repositories::{CaptchaCacheTrait, MockCaptchaCache};
use crate::services::captcha::{
    CaptchaService, CaptchaServiceConfig, GenerateCodeRequest, ValidateCodeRequest,
};

fn create_service() -> (CaptchaService<MockCaptchaCache>, Arc<MockCaptchaCache>) {
    let cache = Arc::new(MockCaptchaCache::new());
    let service = CaptchaService::new(cache.clone(), CaptchaServiceConfig::default());
    (service, cache)
}

fn login_key() -> VerificationKey {
    VerificationKey::new("login", "sms", "+1555").unwrap()
}

#[tokio::test]
async fn test_issue_stores_code() {
    let (service, cache) = create_service();
    let key = login_key();

    let issued = service.issue(&key, Duration::from_secs(60), 3).await.unwrap();
    assert_eq!(issued.code.len(), 6);
    assert!(issued.code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(issued.max_attempts, 3);

    assert!(service.exists(&key).await.unwrap());

    let stored = cache.stored("captcha:login:sms:+1555").await.unwrap();
    assert_eq!(stored.code, issued.code);
    assert_eq!(stored.remaining_attempts, 3);
}

#[tokio::test]
async fn test_issue_twice_returns_already_active() {
    let (service, cache) = create_service();
    let key = login_key();

    let first = service.issue(&key, Duration::from_secs(60), 3).await.unwrap();
    let second = service.issue(&key, Duration::from_secs(60), 3).await;

    assert_eq!(
        second.unwrap_err(),
        DomainError::Captcha(CaptchaError::AlreadyActive)
    );

    // The first code is untouched
    let stored = cache.stored("captcha:login:sms:+1555").await.unwrap();
    assert_eq!(stored.code, first.code);
}

#[tokio::test]
async fn test_wrong_codes_exhaust_budget() {
    let (service, _cache) = create_service();
    let key = login_key();

    let issued = service.issue(&key, Duration::from_secs(60), 3).await.unwrap();
    let wrong = if issued.code == "000000" { "111111" } else { "000000" };

    for expected in [2, 1, 0] {
        let err = service.consume(&key, wrong).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::Captcha(CaptchaError::WrongCode {
                remaining: expected
            })
        );
    }

    // Exhausted is indistinguishable from never issued, even with the right code
    let err = service.consume(&key, &issued.code).await.unwrap_err();
    assert_eq!(err, DomainError::Captcha(CaptchaError::NotFound));
    assert!(!service.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_correct_code_is_single_use() {
    let (service, _cache) = create_service();
    let key = login_key();

    let issued = service.issue(&key, Duration::from_secs(60), 3).await.unwrap();

    service.consume(&key, &issued.code).await.unwrap();

    let err = service.consume(&key, &issued.code).await.unwrap_err();
    assert_eq!(err, DomainError::Captcha(CaptchaError::NotFound));
}

#[tokio::test]
async fn test_consume_trims_candidate() {
    let (service, _cache) = create_service();
    let key = login_key();

    let issued = service.issue(&key, Duration::from_secs(60), 3).await.unwrap();
    let padded = format!(" {} ", issued.code);

    assert!(service.consume(&key, &padded).await.is_ok());
}

#[tokio::test]
async fn test_consume_never_issued() {
    let (service, _cache) = create_service();

    let err = service.consume(&login_key(), "123456").await.unwrap_err();
    assert_eq!(err, DomainError::Captcha(CaptchaError::NotFound));
}

#[tokio::test(start_paused = true)]
async fn test_code_expires_after_ttl() {
    let (service, _cache) = create_service();
    let key = login_key();

    let issued = service.issue(&key, Duration::from_secs(60), 3).await.unwrap();

    tokio::time::advance(Duration::from_secs(59)).await;
    assert_eq!(service.remaining_ttl(&key).await.unwrap(), Some(1));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(!service.exists(&key).await.unwrap());
    assert_eq!(service.remaining_ttl(&key).await.unwrap(), None);

    let err = service.consume(&key, &issued.code).await.unwrap_err();
    assert_eq!(err, DomainError::Captcha(CaptchaError::NotFound));

    // A new code may be issued once the old one has expired
    assert!(service.issue(&key, Duration::from_secs(60), 3).await.is_ok());
}

#[tokio::test]
async fn test_issue_rejects_out_of_range_policy() {
    let (service, cache) = create_service();
    let key = login_key();

    let cases = [
        (Duration::ZERO, 3),
        (Duration::from_secs(3601), 3),
        (Duration::from_secs(60), 0),
        (Duration::from_secs(60), 11),
    ];

    for (ttl, attempts) in cases {
        let err = service.issue(&key, ttl, attempts).await.unwrap_err();
        assert!(
            matches!(err, DomainError::ValidationErr(ValidationError::OutOfRange { .. })),
            "expected OutOfRange for ttl={:?} attempts={}",
            ttl,
            attempts
        );
    }

    // Nothing reached the backend
    assert!(cache.stored("captcha:login:sms:+1555").await.is_none());
}

#[tokio::test]
async fn test_malformed_candidate_does_not_spend_attempt() {
    let (service, cache) = create_service();
    let key = login_key();

    service.issue(&key, Duration::from_secs(60), 3).await.unwrap();

    let err = service.consume(&key, "   ").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::RequiredField { .. })
    ));

    let err = service.consume(&key, "12345678901").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::InvalidLength { .. })
    ));

    assert_eq!(cache.consume_calls(), 0);
    let stored = cache.stored("captcha:login:sms:+1555").await.unwrap();
    assert_eq!(stored.remaining_attempts, 3);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (service, _cache) = create_service();
    let key = login_key();

    let issued = service.issue(&key, Duration::from_secs(60), 3).await.unwrap();

    assert!(service.delete(&key).await.unwrap());
    assert!(!service.delete(&key).await.unwrap());

    let err = service.consume(&key, &issued.code).await.unwrap_err();
    assert_eq!(err, DomainError::Captcha(CaptchaError::NotFound));
}

#[tokio::test]
async fn test_keys_are_isolated_by_purpose() {
    let (service, _cache) = create_service();
    let login = VerificationKey::new("shop", "login", "+1555").unwrap();
    let register = VerificationKey::new("shop", "register", "+1555").unwrap();

    let login_code = service.issue(&login, Duration::from_secs(60), 3).await.unwrap();
    assert!(!service.exists(&register).await.unwrap());

    let register_code = service.issue(&register, Duration::from_secs(60), 3).await.unwrap();

    service.consume(&register, &register_code.code).await.unwrap();
    assert!(service.exists(&login).await.unwrap());
    service.consume(&login, &login_code.code).await.unwrap();
}

#[tokio::test]
async fn test_backend_failure_surfaces_as_store_error() {
    let (service, cache) = create_service();
    cache.set_should_fail(true);

    let err = service.exists(&login_key()).await.unwrap_err();
    assert!(matches!(err, DomainError::Store(StoreError::Unavailable { .. })));
    assert!(err.is_transient());

    // A failing backend is never reported as an invalid code
    let request = ValidateCodeRequest {
        namespace: "login".to_string(),
        biz_type: "sms".to_string(),
        target: "+1555".to_string(),
        captcha: "123456".to_string(),
    };
    let err = service.validate_code(&request).await.unwrap_err();
    assert!(matches!(err, DomainError::Store(_)));
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_times_out() {
    let cache = Arc::new(MockCaptchaCache::new());
    let config = CaptchaServiceConfig {
        operation_timeout: Duration::from_millis(100),
        ..Default::default()
    };
    let service = CaptchaService::new(cache.clone(), config);
    cache.set_latency(Duration::from_secs(5));

    let err = service.consume(&login_key(), "123456").await.unwrap_err();
    assert_eq!(
        err,
        DomainError::Store(StoreError::Timeout {
            operation: "consume",
            elapsed_ms: 100,
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_yields_single_code() {
    let (service, _cache) = create_service();
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.issue(&login_key(), Duration::from_secs(60), 3).await
        }));
    }

    let mut issued = 0;
    let mut already_active = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => issued += 1,
            Err(DomainError::Captcha(CaptchaError::AlreadyActive)) => already_active += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(issued, 1);
    assert_eq!(already_active, 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_correct_consume_succeeds_once() {
    let (service, _cache) = create_service();
    let service = Arc::new(service);

    let code = service
        .issue(&login_key(), Duration::from_secs(60), 3)
        .await
        .unwrap()
        .code;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            service.consume(&login_key(), &code).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(DomainError::Captcha(CaptchaError::NotFound)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(successes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_generate_code_applies_defaults() {
    let (service, _cache) = create_service();

    let request = GenerateCodeRequest {
        namespace: "user-account-service".to_string(),
        biz_type: "login".to_string(),
        target: "alice@example.com".to_string(),
        ..Default::default()
    };

    let result = service.generate_code(&request).await.unwrap();
    assert_eq!(result.issued.ttl, Duration::from_secs(300));
    assert_eq!(result.issued.max_attempts, 3);

    let key = VerificationKey::new("user-account-service", "login", "alice@example.com").unwrap();
    assert_eq!(service.remaining_ttl(&key).await.unwrap(), Some(300));
}

#[tokio::test]
async fn test_generate_code_rejects_bad_key() {
    let (service, _cache) = create_service();

    let request = GenerateCodeRequest {
        namespace: "shop".to_string(),
        biz_type: "".to_string(),
        target: "+1555".to_string(),
        ttl_seconds: Some(60),
        max_attempts: Some(3),
    };

    let err = service.generate_code(&request).await.unwrap_err();
    assert!(matches!(err, DomainError::ValidationErr(_)));
}

#[tokio::test]
async fn test_validate_code_results() {
    let (service, _cache) = create_service();

    let generate = GenerateCodeRequest {
        namespace: "shop".to_string(),
        biz_type: "login".to_string(),
        target: "+1555".to_string(),
        ttl_seconds: Some(60),
        max_attempts: Some(2),
    };
    let code = service.generate_code(&generate).await.unwrap().issued.code;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let mut request = ValidateCodeRequest {
        namespace: "shop".to_string(),
        biz_type: "login".to_string(),
        target: "+1555".to_string(),
        captcha: wrong.to_string(),
    };

    let result = service.validate_code(&request).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.remaining_attempts, Some(1));
    assert!(result.message.contains("1 attempts remaining"));

    request.captcha = code.clone();
    let result = service.validate_code(&request).await.unwrap();
    assert!(result.valid);
    assert_eq!(result.remaining_attempts, None);

    let result = service.validate_code(&request).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.message, "Captcha not found or expired");
}

#[tokio::test]
async fn test_last_wrong_attempt_message() {
    let (service, _cache) = create_service();
    let key = login_key();

    let issued = service.issue(&key, Duration::from_secs(60), 1).await.unwrap();
    let wrong = if issued.code == "000000" { "111111" } else { "000000" };

    let request = ValidateCodeRequest {
        namespace: "login".to_string(),
        biz_type: "sms".to_string(),
        target: "+1555".to_string(),
        captcha: wrong.to_string(),
    };
    let result = service.validate_code(&request).await.unwrap();
    assert_eq!(result.remaining_attempts, Some(0));
    assert!(result.message.contains("revoked"));
}

#[tokio::test]
async fn test_service_over_trait_object() {
    let cache: Arc<dyn CaptchaCacheTrait> = Arc::new(MockCaptchaCache::new());
    let service = CaptchaService::new(cache, CaptchaServiceConfig::default());

    assert_eq!(service.backend_name(), "mock");
    assert!(service.health_check().await.unwrap());

    let issued = service.issue(&login_key(), Duration::from_secs(60), 3).await.unwrap();
    assert!(service.consume(&login_key(), &issued.code).await.is_ok());
}

#[test]
fn test_config_from_shared() {
    let shared = CaptchaConfig {
        code_length: 8,
        operation_timeout_ms: 500,
        ..Default::default()
    };
    let config = CaptchaServiceConfig::from_shared(&shared, "vc").unwrap();
    assert_eq!(config.code_policy.length(), 8);
    assert_eq!(config.operation_timeout, Duration::from_millis(500));
    assert_eq!(config.key_prefix, "vc");

    let invalid = CaptchaConfig {
        code_length: 2,
        ..Default::default()
    };
    let err = CaptchaServiceConfig::from_shared(&invalid, "vc").unwrap_err();
    assert!(matches!(err, DomainError::Config { .. }));
}
