//! # Verification Code Core
//!
//! Domain layer for the verification code service.
//! This crate contains the verification key and code record types, the
//! backend contract, the captcha service, and the error taxonomy shared by
//! the infrastructure and API crates.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
