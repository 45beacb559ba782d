// streamguard-core/src/engine.rs
//! Defines the core SanitizationEngine trait and related data structures.
//!
//! The `SanitizationEngine` trait provides a pluggable interface for different
//! detection methods (lexical regex rules, statistical entity recognition).
//! The redactor and the stream sessions only ever see this trait, so the
//! backend is chosen once at construction and never leaks into the
//! buffering logic.
//!
//! License: MIT OR APACHE 2.0

use std::fmt::Debug;

use crate::errors::Result;
use crate::redaction_match::RedactionMatch;

/// The result of sanitizing one span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sanitized {
    /// The span with every match replaced by its placeholder.
    pub text: String,
    /// What was replaced, in the order it was applied.
    pub matches: Vec<RedactionMatch>,
}

/// A trait that defines the core functionality of a sanitization engine.
///
/// Implementations must be deterministic: the same input always produces
/// the same output. A failing backend returns
/// [`StreamGuardError::DetectorFailure`](crate::errors::StreamGuardError::DetectorFailure)
/// and never passes the span through unredacted.
pub trait SanitizationEngine: Send + Sync + Debug {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Finds what would be redacted in `content` without changing it.
    fn detect(&self, content: &str) -> Result<Vec<RedactionMatch>> {
        Ok(self.sanitize(content)?.matches)
    }

    /// Replaces every sensitive span in `content` with its placeholder.
    fn sanitize(&self, content: &str) -> Result<Sanitized>;
}

/// Splices non-overlapping matches into `content`. Matches must be sorted
/// by `start`; a match overlapping an earlier one is skipped.
pub fn apply_matches(content: &str, matches: &[RedactionMatch]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last_end = 0usize;

    for m in matches {
        if m.start < last_end {
            continue;
        }
        out.push_str(&content[last_end..m.start]);
        out.push_str(&m.sanitized_string);
        last_end = m.end;
    }
    out.push_str(&content[last_end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(start: usize, end: usize, with: &str) -> RedactionMatch {
        RedactionMatch {
            rule_name: "t".into(),
            sanitized_string: with.into(),
            start,
            end,
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_matches_splices_in_order() {
        let text = "SSN 234-56-7890 and CVV 123";
        let out = apply_matches(text, &[m(4, 15, "<SSN>"), m(24, 27, "<CVV>")]);
        assert_eq!(out, "SSN <SSN> and CVV <CVV>");
    }

    #[test]
    fn test_apply_matches_skips_overlaps() {
        let out = apply_matches("abcdef", &[m(0, 4, "X"), m(2, 6, "Y")]);
        assert_eq!(out, "Xef");
    }
}
