use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use vc_core::domain::value_objects::VerificationKey;
use vc_core::errors::DomainError;
use vc_core::repositories::CaptchaCacheTrait;
use vc_shared::ApiResponse;

use super::AppState;
use crate::dto::captcha::{CaptchaKeyRequest, ExistsCaptchaResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};
use crate::handlers::extract_request_id;

/// Handler for POST /api/v1/captcha/exists
///
/// Side-effect free: reports whether a code is outstanding and, if so, how
/// many seconds it has left.
pub async fn exists<C>(
    req: HttpRequest,
    state: web::Data<AppState<C>>,
    request: web::Json<CaptchaKeyRequest>,
) -> HttpResponse
where
    C: CaptchaCacheTrait + ?Sized + 'static,
{
    let request_id = extract_request_id(&req);

    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors, &request_id);
    }

    let key = match VerificationKey::new(&request.namespace, &request.biz_type, &request.target) {
        Ok(key) => key,
        Err(e) => return handle_domain_error(&DomainError::from(e), &request_id),
    };

    // One backend read, so `active` and `expires_in` always agree
    let expires_in = match state.captcha_service.remaining_ttl(&key).await {
        Ok(ttl) => ttl,
        Err(e) => return handle_domain_error(&e, &request_id),
    };
    let active = expires_in.is_some();

    log::debug!("[{}] Captcha for {} active: {}", request_id, key, active);

    let response = ExistsCaptchaResponse { active, expires_in };
    HttpResponse::Ok().json(ApiResponse::success(response).with_request_id(request_id))
}
