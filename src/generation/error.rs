//! Generation errors

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::generation::checks::CheckTag;

/// A failed validator check
#[derive(Clone, Debug, PartialEq)]
pub struct CheckFailure {
    pub check: &'static str,
    pub tag: CheckTag,
    pub reason: String,
}

impl CheckFailure {
    pub fn new(check: &'static str, tag: CheckTag, reason: impl Into<String>) -> Self {
        CheckFailure { check, tag, reason: reason.into() }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?}]: {}", self.check, self.tag, self.reason)
    }
}

#[derive(Clone, Debug, Error)]
pub enum GenerationError {
    /// A candidate failed a check; the attempt is retried.
    #[error("validation failed: {0}")]
    ValidationFailed(CheckFailure),

    /// No biological age satisfied the constraints; a best-effort age was used.
    #[error("age sampling exhausted after {tries} tries")]
    AgeSamplingExhausted { tries: u32 },

    /// Health seeding kept incapacitating the pawn; the last roll was kept.
    #[error("health seeding exhausted after {tries} tries")]
    HealthSeedingExhausted { tries: u32 },

    /// Terminal: no valid pawn could be produced.
    #[error("gave up after {attempts} attempts; last failure: {last_failure}")]
    RetriesExhausted { attempts: u32, last_failure: String },

    #[error("unknown {kind} '{name}'")]
    UnknownDef { kind: &'static str, name: String },
}

impl GenerationError {
    pub fn unknown(kind: &'static str, name: &str) -> Self {
        GenerationError::UnknownDef { kind, name: name.to_string() }
    }

    /// Whether the error only aborts the current attempt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            GenerationError::RetriesExhausted { .. } | GenerationError::UnknownDef { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
