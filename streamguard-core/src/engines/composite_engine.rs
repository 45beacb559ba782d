// streamguard-core/src/engines/composite_engine.rs
//! Chains several engines. Each engine sees the output of the one before
//! it, so placeholders written by an earlier engine are plain text to the
//! later ones.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use crate::engine::{SanitizationEngine, Sanitized};
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct CompositeEngine {
    engines: Vec<Arc<dyn SanitizationEngine>>,
}

impl CompositeEngine {
    pub fn new(engines: Vec<Arc<dyn SanitizationEngine>>) -> Self {
        Self { engines }
    }
}

impl SanitizationEngine for CompositeEngine {
    fn name(&self) -> &str {
        "hybrid"
    }

    /// Stops at the first failing engine; nothing partial is returned.
    fn sanitize(&self, content: &str) -> Result<Sanitized> {
        let mut text = content.to_string();
        let mut matches = Vec::new();

        for engine in &self.engines {
            let step = engine.sanitize(&text)?;
            text = step.text;
            matches.extend(step.matches);
        }

        Ok(Sanitized { text, matches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, RuleTable};
    use crate::engines::entity_engine::EntityEngine;
    use crate::engines::regex_engine::RegexEngine;

    #[test]
    fn test_entity_engine_sees_regex_output() {
        let table = RuleTable::load_default_rules().unwrap();
        let hybrid = CompositeEngine::new(vec![
            Arc::new(RegexEngine::new(&table).unwrap()),
            Arc::new(EntityEngine::new(&EngineConfig::default()).unwrap()),
        ]);

        // The regex table has no passport rule; the entity engine picks it up.
        let out = hybrid.sanitize("SSN 234-56-7890, passport: X12345678Z").unwrap();
        assert_eq!(out.text, "SSN [REDACTED-SSN], passport: <ID>");
        let rules: Vec<&str> = out.matches.iter().map(|m| m.rule_name.as_str()).collect();
        assert_eq!(rules, vec!["ssn", "ID"]);
    }
}
