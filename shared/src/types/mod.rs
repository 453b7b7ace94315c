//! Type definitions module
//!
//! - `response` - API response wrappers and health checks

pub mod response;

pub use response::{ApiResponse, ErrorResponse, HealthResponse, HealthStatus, ServiceHealth};
