//! Request and response bodies for the HTTP surface

pub mod captcha;

pub use captcha::{
    CaptchaKeyRequest, ExistsCaptchaResponse, GenerateCaptchaRequest, GenerateCaptchaResponse,
    RevokeCaptchaResponse, ValidateCaptchaRequest, ValidateCaptchaResponse,
};
