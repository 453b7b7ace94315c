use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use vc_core::domain::value_objects::VerificationKey;
use vc_core::errors::DomainError;
use vc_core::repositories::CaptchaCacheTrait;
use vc_shared::ApiResponse;

use super::AppState;
use crate::dto::captcha::{CaptchaKeyRequest, RevokeCaptchaResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};
use crate::handlers::extract_request_id;

/// Handler for POST /api/v1/captcha/revoke
///
/// Idempotent: revoking a key with no outstanding code succeeds with
/// `revoked: false`.
pub async fn revoke<C>(
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

    match state.captcha_service.delete(&key).await {
        Ok(revoked) => {
            log::info!("[{}] Revoke for {}: {}", request_id, key, revoked);
            let response = RevokeCaptchaResponse { revoked };
            HttpResponse::Ok().json(ApiResponse::success(response).with_request_id(request_id))
        }
        Err(e) => handle_domain_error(&e, &request_id),
    }
}
