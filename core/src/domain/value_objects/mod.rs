//! Value objects representing immutable domain concepts.

pub mod code_policy;
pub mod verification_key;

// Re-export commonly used types
pub use code_policy::{CodePolicy, DEFAULT_CODE_LENGTH};
pub use verification_key::{VerificationKey, MAX_COMPONENT_BYTES};
