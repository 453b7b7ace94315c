//! Stored state of an outstanding verification code.

use std::fmt;
use std::time::Duration;

use constant_time_eq::constant_time_eq;

use crate::domain::value_objects::VerificationKey;

/// Record held by a backend for one key
///
/// `remaining_attempts` only ever decreases. A record is removed on the first
/// matching attempt, when its budget reaches zero, or when its TTL elapses.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeRecord {
    /// The secret, or a digest of it when the backend stores digests
    pub code: String,

    /// Validation attempts still permitted
    pub remaining_attempts: u32,
}

impl CodeRecord {
    pub fn new(code: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            code: code.into(),
            remaining_attempts: max_attempts,
        }
    }

    /// Constant-time comparison against a candidate
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }

    /// Apply one validation attempt to this record
    ///
    /// The caller removes the record when the returned outcome says so.
    pub fn register_attempt(&mut self, candidate: &str) -> ConsumeOutcome {
        if self.remaining_attempts == 0 {
            return ConsumeOutcome::Absent;
        }

        if self.matches(candidate) {
            return ConsumeOutcome::Matched;
        }

        self.remaining_attempts -= 1;
        ConsumeOutcome::Mismatch {
            remaining: self.remaining_attempts,
        }
    }
}

impl fmt::Debug for CodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeRecord")
            .field("code", &"[REDACTED]")
            .field("remaining_attempts", &self.remaining_attempts)
            .finish()
    }
}

/// Result of a single atomic Consume against the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Candidate matched; the record has been deleted
    Matched,

    /// Candidate did not match; `remaining` attempts are left
    Mismatch { remaining: u32 },

    /// No record, already expired, or budget already spent
    Absent,
}

impl ConsumeOutcome {
    /// Whether the backend must delete the record after this outcome
    pub fn removes_record(&self) -> bool {
        match self {
            ConsumeOutcome::Matched | ConsumeOutcome::Absent => true,
            ConsumeOutcome::Mismatch { remaining } => *remaining == 0,
        }
    }
}

/// A freshly issued code, handed to whoever delivers it
#[derive(Clone)]
pub struct IssuedCode {
    pub key: VerificationKey,
    pub code: String,
    pub ttl: Duration,
    pub max_attempts: u32,
}

impl fmt::Debug for IssuedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCode")
            .field("key", &self.key)
            .field("code", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
