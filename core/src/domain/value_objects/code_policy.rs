//! Secret generation policy

use rand::rngs::OsRng;
use rand::Rng;
use vc_shared::config::captcha::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

use crate::errors::ValidationError;

/// Number of digits used when nothing else is configured
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Shape of generated secrets: a fixed number of decimal digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePolicy {
    length: usize,
}

impl CodePolicy {
    /// Create a policy for codes of `length` digits
    ///
    /// # Errors
    ///
    /// `ValidationError::OutOfRange` when the length is outside 4..=10.
    pub fn new(length: usize) -> Result<Self, ValidationError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
            return Err(ValidationError::OutOfRange {
                field: "code_length".to_string(),
                min: MIN_CODE_LENGTH as u64,
                max: MAX_CODE_LENGTH as u64,
                actual: length as u64,
            });
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Draw a fresh code from the operating system CSPRNG
    ///
    /// Uniform over `0..10^length`, zero-padded to `length` digits.
    pub fn generate(&self) -> String {
        let upper = 10u64.pow(self.length as u32);
        let value = OsRng.gen_range(0..upper);
        format!("{:0width$}", value, width = self.length)
    }

    /// Guessing entropy of a single code in bits
    pub fn entropy_bits(&self) -> f64 {
        self.length as f64 * 10f64.log2()
    }

    /// Whether `candidate` could have been produced by this policy
    pub fn is_well_formed(&self, candidate: &str) -> bool {
        candidate.len() == self.length && candidate.bytes().all(|b| b.is_ascii_digit())
    }
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }
}
