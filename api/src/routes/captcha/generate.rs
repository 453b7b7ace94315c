use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use vc_core::repositories::CaptchaCacheTrait;
use vc_core::services::GenerateCodeRequest;
use vc_shared::{mask_target, ApiResponse};

use super::AppState;
use crate::dto::captcha::{GenerateCaptchaRequest, GenerateCaptchaResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};
use crate::handlers::extract_request_id;

/// Handler for POST /api/v1/captcha/generate
///
/// Issues a code for the key. The code itself is never returned; it goes
/// to the delivery channel (or the log when code printing is enabled).
///
/// # Request Body
///
/// ```json
/// {
///     "namespace": "user-account-service",
///     "biz_type": "login",
///     "target": "+15550001111",
///     "ttl_seconds": 300,
///     "max_attempts": 3
/// }
/// ```
///
/// # Responses
/// * `200` - Code issued
/// * `400` - Invalid key or policy
/// * `409` - A code is already outstanding for this key
/// * `503` - Backend unavailable
pub async fn generate<C>(
    req: HttpRequest,
    state: web::Data<AppState<C>>,
    request: web::Json<GenerateCaptchaRequest>,
) -> HttpResponse
where
    C: CaptchaCacheTrait + ?Sized + 'static,
{
    let request_id = extract_request_id(&req);

    log::info!(
        "[{}] Processing generate request for {}/{} target: {}",
        request_id,
        request.namespace,
        request.biz_type,
        mask_target(&request.target)
    );

    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors, &request_id);
    }

    let command: GenerateCodeRequest = request.into_inner().into();

    match state.captcha_service.generate_code(&command).await {
        Ok(result) => {
            let response = GenerateCaptchaResponse {
                message: "Captcha generated".to_string(),
                ttl_seconds: result.issued.ttl.as_secs(),
                max_attempts: result.issued.max_attempts,
                expires_at: result.expires_at,
            };
            HttpResponse::Ok().json(ApiResponse::success(response).with_request_id(request_id))
        }
        Err(e) => handle_domain_error(&e, &request_id),
    }
}
