//! Business services containing domain logic and use cases.

pub mod captcha;

// Re-export commonly used types
pub use captcha::{
    CaptchaService, CaptchaServiceConfig, GenerateCodeRequest, GenerateCodeResult,
    ValidateCodeRequest, ValidateCodeResult,
};
