// streamguard-core/src/engines/mod.rs
//! This module contains the sanitization engine implementations.
//!
//! Each engine is a separate file within this directory and implements the
//! `SanitizationEngine` trait. `EngineKind` and [`build_engine`] pick one
//! at construction time.

use std::str::FromStr;
use std::sync::Arc;

use crate::config::RuleTable;
use crate::engine::SanitizationEngine;
use crate::errors::{Result, StreamGuardError};

pub mod composite_engine;
pub mod entity_engine;
pub mod regex_engine;

use composite_engine::CompositeEngine;
use entity_engine::EntityEngine;
use regex_engine::RegexEngine;

/// Which detection backend a redactor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// Lexical rules from the rule table.
    #[default]
    Regex,
    /// Statistical entity recognition.
    Entity,
    /// Regex rules first, then entity recognition on what is left.
    Hybrid,
}

impl FromStr for EngineKind {
    type Err = StreamGuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "regex" => Ok(EngineKind::Regex),
            "entity" => Ok(EngineKind::Entity),
            "hybrid" => Ok(EngineKind::Hybrid),
            other => Err(StreamGuardError::UnknownEngine(other.to_string())),
        }
    }
}

/// Instantiates the selected engine behind the `SanitizationEngine` trait.
pub fn build_engine(kind: EngineKind, table: &RuleTable) -> Result<Arc<dyn SanitizationEngine>> {
    log::debug!("Building {:?} engine.", kind);
    let engine: Arc<dyn SanitizationEngine> = match kind {
        EngineKind::Regex => Arc::new(RegexEngine::new(table)?),
        EngineKind::Entity => Arc::new(EntityEngine::new(&table.engines)?),
        EngineKind::Hybrid => Arc::new(CompositeEngine::new(vec![
            Arc::new(RegexEngine::new(table)?),
            Arc::new(EntityEngine::new(&table.engines)?),
        ])),
    };
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_parses_case_insensitively() {
        assert_eq!("regex".parse::<EngineKind>().unwrap(), EngineKind::Regex);
        assert_eq!("Entity".parse::<EngineKind>().unwrap(), EngineKind::Entity);
        assert_eq!("HYBRID".parse::<EngineKind>().unwrap(), EngineKind::Hybrid);
        assert!(matches!(
            "presidio".parse::<EngineKind>(),
            Err(StreamGuardError::UnknownEngine(name)) if name == "presidio"
        ));
    }

    #[test]
    fn test_build_engine_for_every_kind() {
        let table = RuleTable::load_default_rules().unwrap();
        for kind in [EngineKind::Regex, EngineKind::Entity, EngineKind::Hybrid] {
            let engine = build_engine(kind, &table).unwrap();
            let out = engine.sanitize("SSN 234-56-7890").unwrap();
            assert!(!out.text.contains("234-56-7890"), "{:?} left the SSN in place", kind);
        }
    }
}
