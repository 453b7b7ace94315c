//! # Verification Code API
//!
//! HTTP surface of the verification code service. Exposed as a library so
//! integration tests can build the application in-process.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod telemetry;

pub use app::create_app;
pub use routes::captcha::AppState;
