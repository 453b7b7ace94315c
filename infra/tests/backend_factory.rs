//! Backend selection from configuration

use vc_core::domain::entities::CodeRecord;
use vc_infra::build_captcha_cache;
use vc_shared::config::cache::{CacheStrategyConfig, CacheType};

use std::time::Duration;

#[tokio::test]
async fn test_memory_backend_from_config() {
    let config = CacheStrategyConfig {
        cache_type: CacheType::Memory,
        ..Default::default()
    };

    let cache = build_captcha_cache(&config).await.unwrap();
    assert_eq!(cache.backend_name(), "memory");
    assert!(cache.health_check().await.unwrap());

    let record = CodeRecord::new("123456", 3);
    assert!(cache
        .insert_if_absent("captcha:shop:login:x", &record, Duration::from_secs(60))
        .await
        .unwrap());
    assert!(cache.exists("captcha:shop:login:x").await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_redis_backend_from_config() {
    dotenvy::dotenv().ok();

    let config = CacheStrategyConfig {
        cache_type: CacheType::Redis,
        ..CacheStrategyConfig::from_env()
    };

    let cache = build_captcha_cache(&config).await.unwrap();
    assert_eq!(cache.backend_name(), "redis");
    assert!(cache.health_check().await.unwrap());
}
