//! Captcha route handlers
//!
//! This module contains the verification code endpoints:
//! - Generating a code for a (namespace, biz_type, target) key
//! - Validating a candidate code
//! - Checking for and revoking an outstanding code

pub mod exists;
pub mod generate;
pub mod revoke;
pub mod validate;

use std::sync::Arc;

use vc_core::repositories::CaptchaCacheTrait;
use vc_core::services::CaptchaService;

/// Application state that holds shared services
pub struct AppState<C>
where
    C: CaptchaCacheTrait + ?Sized,
{
    pub captcha_service: Arc<CaptchaService<C>>,
}

impl<C> AppState<C>
where
    C: CaptchaCacheTrait + ?Sized,
{
    pub fn new(captcha_service: Arc<CaptchaService<C>>) -> Self {
        Self { captcha_service }
    }
}
