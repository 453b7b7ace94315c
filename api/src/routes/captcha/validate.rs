use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use vc_core::repositories::CaptchaCacheTrait;
use vc_core::services::ValidateCodeRequest;
use vc_shared::{mask_target, ApiResponse};

use super::AppState;
use crate::dto::captcha::{ValidateCaptchaRequest, ValidateCaptchaResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};
use crate::handlers::extract_request_id;

/// Handler for POST /api/v1/captcha/validate
///
/// # Responses
/// * `200` - `valid: true`; the code has been consumed
/// * `400` - `valid: false` with `message` and, after a mismatch,
///   `remaining_attempts`
/// * `503` - Backend unavailable or timed out. The outcome is unknown and
///   is never reported as `valid: false`.
pub async fn validate<C>(
    req: HttpRequest,
    state: web::Data<AppState<C>>,
    request: web::Json<ValidateCaptchaRequest>,
) -> HttpResponse
where
    C: CaptchaCacheTrait + ?Sized + 'static,
{
    let request_id = extract_request_id(&req);

    log::info!(
        "[{}] Processing validate request for {}/{} target: {}",
        request_id,
        request.namespace,
        request.biz_type,
        mask_target(&request.target)
    );

    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors, &request_id);
    }

    let command: ValidateCodeRequest = request.into_inner().into();

    match state.captcha_service.validate_code(&command).await {
        Ok(result) if result.valid => {
            let body = ValidateCaptchaResponse::from(result);
            HttpResponse::Ok().json(ApiResponse::success(body).with_request_id(request_id))
        }
        Ok(result) => {
            let body = ValidateCaptchaResponse::from(result);
            let message = body.message.clone();
            HttpResponse::BadRequest()
                .json(ApiResponse::failure(body, message).with_request_id(request_id))
        }
        Err(e) => handle_domain_error(&e, &request_id),
    }
}
