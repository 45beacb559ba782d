//! errors.rs - Error type returned by sessions, engines and rule compilation.
//!
//! Loading configuration from disk is the exception: those functions return
//! `anyhow::Result` so the file path travels with the failure.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// Everything that can go wrong inside `streamguard-core`.
///
/// Marked `#[non_exhaustive]`; match with a wildcard arm.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StreamGuardError {
    /// The session parameters are inconsistent. Raised at construction;
    /// a session with this configuration never exists.
    #[error("Invalid session configuration (buffer_size={buffer_size}, safety_margin={safety_margin}): {reason}")]
    InvalidSessionConfig {
        buffer_size: usize,
        safety_margin: usize,
        reason: String,
    },

    #[error("Failed to compile redaction rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Rule '{0}': pattern is {1} bytes, the limit is {2}")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Invalid rule table: {0}")]
    InvalidRuleTable(String),

    /// A detection backend failed while redacting a span. The span was not
    /// emitted and the session buffer is unchanged.
    #[error("Detector '{engine}' failed: {message}")]
    DetectorFailure { engine: String, message: String },

    #[error("Session already finalized; call reset() before processing more fragments")]
    SessionFinalized,

    #[error("Unknown engine '{0}' (expected regex, entity or hybrid)")]
    UnknownEngine(String),
}

impl StreamGuardError {
    /// Builds a [`StreamGuardError::DetectorFailure`].
    pub fn detector(engine: impl Into<String>, message: impl ToString) -> Self {
        StreamGuardError::DetectorFailure {
            engine: engine.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = StreamGuardError> = std::result::Result<T, E>;
