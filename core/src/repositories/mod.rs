pub mod captcha;

pub use captcha::CaptchaCacheTrait;

#[cfg(test)]
pub use captcha::MockCaptchaCache;
