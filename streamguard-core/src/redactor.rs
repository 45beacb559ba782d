// streamguard-core/src/redactor.rs
//! The redactor: turns a completed span into its redacted form.
//!
//! A `Redactor` holds no per-stream state. It wraps one shared engine, so
//! cloning it for every new session costs a reference count.

use std::sync::Arc;

use log::{debug, warn};

use crate::config::RuleTable;
use crate::engine::{SanitizationEngine, Sanitized};
use crate::engines::{build_engine, EngineKind};
use crate::errors::{Result, StreamGuardError};

#[derive(Debug, Clone)]
pub struct Redactor {
    engine: Arc<dyn SanitizationEngine>,
}

impl Redactor {
    pub fn new(engine: Arc<dyn SanitizationEngine>) -> Self {
        Self { engine }
    }

    /// Builds the selected engine over `table` and wraps it.
    pub fn from_rule_table(table: &RuleTable, kind: EngineKind) -> Result<Self> {
        Ok(Self::new(build_engine(kind, table)?))
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Returns `span` with every detected match replaced.
    pub fn redact(&self, span: &str) -> Result<String> {
        Ok(self.redact_with_matches(span)?.text)
    }

    /// Like [`Redactor::redact`], also returning what was replaced.
    ///
    /// Any engine error comes back as `DetectorFailure`; the span is never
    /// returned unredacted in its place.
    pub fn redact_with_matches(&self, span: &str) -> Result<Sanitized> {
        if span.is_empty() {
            return Ok(Sanitized::default());
        }

        match self.engine.sanitize(span) {
            Ok(sanitized) => {
                debug!(
                    "Redacted span of {} bytes with '{}' engine: {} match(es).",
                    span.len(),
                    self.engine.name(),
                    sanitized.matches.len()
                );
                Ok(sanitized)
            }
            Err(e @ StreamGuardError::DetectorFailure { .. }) => {
                warn!("Engine '{}' failed: {}", self.engine.name(), e);
                Err(e)
            }
            Err(other) => {
                warn!("Engine '{}' failed: {}", self.engine.name(), other);
                Err(StreamGuardError::detector(self.engine.name(), other))
            }
        }
    }
}
