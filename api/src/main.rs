use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;

use vc_api::{create_app, telemetry, AppState};
use vc_core::services::{CaptchaService, CaptchaServiceConfig};
use vc_infra::build_captcha_cache;
use vc_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_tracing(&config.logging).context("failed to install tracing subscriber")?;

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    tracing::info!(
        environment = %config.environment,
        backend = ?config.cache.cache_type,
        log_format = ?config.logging.format,
        "Starting verification code service"
    );

    let cache = build_captcha_cache(&config.cache)
        .await
        .context("failed to initialize captcha backend")?;

    let service_config =
        CaptchaServiceConfig::from_shared(&config.captcha, config.cache.redis.key_prefix.clone())
            .context("invalid captcha configuration")?;
    let captcha_service = Arc::new(CaptchaService::new(cache, service_config));
    let app_state = web::Data::new(AppState::new(captcha_service));

    let bind_address = config.server.bind_address();
    let max_payload_size = config.server.max_payload_size;
    tracing::info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(app_state.clone(), max_payload_size));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server error")?;

    Ok(())
}
