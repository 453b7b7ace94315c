//! Domain entities representing core business objects.

pub mod code_record;


// Re-export commonly used types
pub use code_record::{CodeRecord, ConsumeOutcome, IssuedCode};
