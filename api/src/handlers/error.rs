use std::collections::HashMap;

use actix_web::{http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use vc_core::errors::{CaptchaError, DomainError, StoreError, ValidationError};
use vc_shared::ErrorResponse;

/// Map a domain error to an HTTP response
///
/// Business outcomes are logged at info level; only backend failures are
/// logged as errors.
pub fn handle_domain_error(error: &DomainError, request_id: &str) -> HttpResponse {
    let status = status_for(error);

    match error {
        DomainError::Store(_) | DomainError::Config { .. } => {
            log::error!("[{}] Domain Error: {}", request_id, error);
        }
        _ => {
            log::info!("[{}] Request rejected: {}", request_id, error);
        }
    }

    let response =
        ErrorResponse::new(error.error_code(), public_message(error)).with_request_id(request_id);

    HttpResponse::build(status).json(response)
}

/// Map `validator` failures to a 400 with per-field messages
pub fn handle_validation_errors(errors: &ValidationErrors, request_id: &str) -> HttpResponse {
    let mut details = HashMap::new();

    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), serde_json::json!(messages));
    }

    log::warn!("[{}] Validation failed: {:?}", request_id, details);

    HttpResponse::BadRequest().json(
        ErrorResponse::new("validation_error", "Request validation failed")
            .with_details(details)
            .with_request_id(request_id),
    )
}

pub(crate) fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::ValidationErr(_) => StatusCode::BAD_REQUEST,
        DomainError::Captcha(CaptchaError::AlreadyActive) => StatusCode::CONFLICT,
        DomainError::Captcha(_) => StatusCode::BAD_REQUEST,
        DomainError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// Backend details stay in the logs.
fn public_message(error: &DomainError) -> String {
    match error {
        DomainError::Store(StoreError::Timeout { .. }) => {
            "Captcha service timed out, please retry".to_string()
        }
        DomainError::Store(_) | DomainError::Config { .. } => "Internal error".to_string(),
        DomainError::ValidationErr(ValidationError::OutOfRange { field, min, max, .. }) => {
            format!("{} must be between {} and {}", field, min, max)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&CaptchaError::AlreadyActive.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(status_for(&CaptchaError::NotFound.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&StoreError::unavailable("down").into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(
                &ValidationError::RequiredField {
                    field: "target".to_string()
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_details_are_not_exposed() {
        let error: DomainError = StoreError::unavailable("redis://secret@host refused").into();
        assert_eq!(public_message(&error), "Internal error");
    }
}
