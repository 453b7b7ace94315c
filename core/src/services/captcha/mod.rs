//! Captcha service module
//!
//! This module provides the verification code workflow:
//! - Issuing a code for a (namespace, biz_type, target) key
//! - Consuming a code against its attempt budget
//! - Peeking at and revoking outstanding codes
//! - Deadline enforcement on every backend call

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::CaptchaServiceConfig;
pub use service::CaptchaService;
pub use types::{GenerateCodeRequest, GenerateCodeResult, ValidateCodeRequest, ValidateCodeResult};
