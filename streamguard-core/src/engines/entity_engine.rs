// streamguard-core/src/engines/entity_engine.rs
//! A `SanitizationEngine` implementation backed by the statistical entity
//! recognizer in `streamguard-entity`.
//!
//! Unlike the regex engine it has no rule table: entities are found from
//! their shape, checksum validity and the keywords in front of them, and
//! each one is replaced by a `<KIND>` placeholder such as `<US_SSN>`.
//! Phone numbers and e-mail addresses are never replaced.
//!
//! License: MIT OR APACHE 2.0

use streamguard_entity::engine::{EntityEngine as LowLevelEntityEngine, EntityMatch};

use crate::config::EngineConfig;
use crate::engine::{apply_matches, SanitizationEngine, Sanitized};
use crate::errors::{Result, StreamGuardError};
use crate::redaction_match::{log_redaction_match_debug, RedactionMatch};

/// Confidence threshold used when the config does not set one.
pub const DEFAULT_ENTITY_THRESHOLD: f64 = 0.5;

/// A sanitization engine that detects entities from shape and context.
#[derive(Debug)]
pub struct EntityEngine {
    inner_engine: LowLevelEntityEngine,
}

impl EntityEngine {
    /// Initializes the engine from the `engines.entity` section.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let threshold = config.entity.threshold.unwrap_or(DEFAULT_ENTITY_THRESHOLD);
        let mut inner_engine = LowLevelEntityEngine::new(threshold)
            .map_err(|e| StreamGuardError::detector("entity", e))?;
        if let Some(window) = config.entity.context_window {
            inner_engine = inner_engine.with_context_window(window);
        }

        log::debug!(
            "EntityEngine ready with confidence threshold: {}",
            inner_engine.confidence_threshold()
        );
        Ok(Self { inner_engine })
    }

    fn to_redaction_match(&self, content: &str, em: &EntityMatch) -> Result<RedactionMatch> {
        let original = content.get(em.start..em.end).ok_or_else(|| {
            StreamGuardError::detector(
                "entity",
                format!("span {}..{} is not on a character boundary", em.start, em.end),
            )
        })?;
        let placeholder = format!("<{}>", em.kind.label());
        log_redaction_match_debug("[entity_engine]", em.kind.label(), original, &placeholder);

        Ok(RedactionMatch {
            rule_name: em.kind.label().to_string(),
            original_string: original.to_string(),
            sanitized_string: placeholder,
            start: em.start,
            end: em.end,
            sample_hash: None,
        })
    }
}

impl SanitizationEngine for EntityEngine {
    fn name(&self) -> &str {
        "entity"
    }

    fn detect(&self, content: &str) -> Result<Vec<RedactionMatch>> {
        self.inner_engine
            .scan(content.as_bytes())
            .iter()
            .map(|em| self.to_redaction_match(content, em))
            .collect()
    }

    fn sanitize(&self, content: &str) -> Result<Sanitized> {
        let matches = self.detect(content)?;
        let text = apply_matches(content, &matches);
        Ok(Sanitized { text, matches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EntityEngine {
        EntityEngine::new(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_ssn_becomes_placeholder() {
        let out = engine().sanitize("My SSN is 234-56-7890 today").unwrap();
        assert_eq!(out.text, "My SSN is <US_SSN> today");
        assert_eq!(out.matches[0].rule_name, "US_SSN");
    }

    #[test]
    fn test_labelled_card_fields() {
        let out = engine().sanitize("Exp: 05/29, CVV: 1234").unwrap();
        assert_eq!(out.text, "Exp: <CARD_EXPIRY>, CVV: <CVV>");
    }

    #[test]
    fn test_contact_details_pass_through() {
        let text = "Contact Amanda at a@b.com or (206) 555-0683";
        assert_eq!(engine().sanitize(text).unwrap().text, text);
    }

    #[test]
    fn test_redacting_twice_changes_nothing() {
        let e = engine();
        let once = e.sanitize("Born July 3, 1979. Income: $112,800. SSN 234-56-7890").unwrap().text;
        assert_eq!(e.sanitize(&once).unwrap().text, once);
    }
}
