//! Application factory
//!
//! Builds the Actix-web application from shared state. Used by the binary
//! and by the integration tests.

use std::collections::HashMap;
use std::time::Instant;

use actix_web::{error::InternalError, web, App, HttpRequest, HttpResponse};
use tracing_actix_web::TracingLogger;

use vc_core::repositories::CaptchaCacheTrait;
use vc_shared::{ErrorResponse, HealthResponse, HealthStatus, ServiceHealth};

use crate::handlers::extract_request_id;
use crate::routes::captcha::{
    exists::exists, generate::generate, revoke::revoke, validate::validate, AppState,
};

/// Create and configure the application with all dependencies
pub fn create_app<C>(
    app_state: web::Data<AppState<C>>,
    max_payload_size: usize,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    C: CaptchaCacheTrait + ?Sized + 'static,
{
    let json_config = web::JsonConfig::default()
        .limit(max_payload_size)
        .error_handler(|err, req| {
            let request_id = extract_request_id(req);
            log::warn!("[{}] Rejected request body: {}", request_id, err);
            let response = HttpResponse::BadRequest().json(
                ErrorResponse::new("invalid_body", err.to_string()).with_request_id(request_id),
            );
            InternalError::from_response(err, response).into()
        });

    App::new()
        // Add application state
        .app_data(app_state)
        .app_data(json_config)
        .wrap(TracingLogger::default())
        // Health check endpoint
        .route("/health", web::get().to(health_check::<C>))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/captcha")
                    .route("/generate", web::post().to(generate::<C>))
                    .route("/validate", web::post().to(validate::<C>))
                    .route("/exists", web::post().to(exists::<C>))
                    .route("/revoke", web::post().to(revoke::<C>)),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
///
/// Reports the captcha backend's connectivity; 503 when it is unreachable.
async fn health_check<C>(state: web::Data<AppState<C>>) -> HttpResponse
where
    C: CaptchaCacheTrait + ?Sized + 'static,
{
    let service = &state.captcha_service;
    let started = Instant::now();
    let result = service.health_check().await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let store = match result {
        Ok(true) => ServiceHealth {
            status: HealthStatus::Healthy,
            message: None,
            response_time_ms: Some(elapsed_ms),
        },
        Ok(false) => ServiceHealth {
            status: HealthStatus::Degraded,
            message: Some("unexpected health check reply".to_string()),
            response_time_ms: Some(elapsed_ms),
        },
        Err(e) => {
            log::error!("Captcha backend health check failed: {}", e);
            ServiceHealth {
                status: HealthStatus::Unhealthy,
                message: Some(e.error_code().to_string()),
                response_time_ms: None,
            }
        }
    };

    let mut services = HashMap::new();
    services.insert(format!("captcha_store:{}", service.backend_name()), store);
    let health = HealthResponse::from_services(services, env!("CARGO_PKG_VERSION"));

    match health.status {
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(health),
        _ => HttpResponse::Ok().json(health),
    }
}

/// 404 handler
async fn not_found(req: HttpRequest) -> HttpResponse {
    let request_id = extract_request_id(&req);
    HttpResponse::NotFound().json(
        ErrorResponse::new("not_found", format!("No route for {}", req.path()))
            .with_request_id(request_id),
    )
}
