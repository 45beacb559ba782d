// streamguard-core/src/engines/regex_engine.rs
//! A `SanitizationEngine` implementation that uses regular expressions
//! to identify and redact sensitive data.
//!
//! Rules are applied one after another in table order. Each rule runs on the
//! output of the rules before it, which is what makes the rule order a
//! contract: a card number is gone before the generic SSN or amount rules
//! get to look at its digits.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use regex::Captures;
use streamguard_entity::validators::{is_valid_luhn, is_valid_ssn};

use crate::config::RuleTable;
use crate::engine::{SanitizationEngine, Sanitized};
use crate::errors::Result;
use crate::redaction_match::{log_redaction_match_debug, RedactionMatch};
use crate::sanitizers::compiler::{compile_rules, CompiledRule, CompiledRules};

#[derive(Debug, Clone)]
pub struct RegexEngine {
    compiled_rules: Arc<CompiledRules>,
}

impl RegexEngine {
    /// Compiles the enabled rules of `table`.
    pub fn new(table: &RuleTable) -> Result<Self> {
        let compiled = compile_rules(&table.rules)?;
        log::debug!("RegexEngine ready with {} rules.", compiled.len());
        Ok(Self::from_compiled(Arc::new(compiled)))
    }

    /// Wraps rules that were already compiled, sharing them.
    pub fn from_compiled(compiled_rules: Arc<CompiledRules>) -> Self {
        Self { compiled_rules }
    }

    fn run_programmatic_validator(compiled_rule: &CompiledRule, matched: &str) -> bool {
        if !compiled_rule.programmatic_validation {
            return true;
        }
        match compiled_rule.name.as_str() {
            "ssn" | "us_ssn" => is_valid_ssn(matched.as_bytes()),
            "credit_card" | "visa_card" | "mastercard_card" | "amex_card" | "discover_card" => {
                is_valid_luhn(matched.as_bytes())
            }
            _ => true,
        }
    }

    /// Applies one rule to `text`, recording what it replaced.
    fn apply_rule(rule: &CompiledRule, text: &str, matches: &mut Vec<RedactionMatch>) -> String {
        let replaced = rule.regex.replace_all(text, |caps: &Captures| {
            // Group 0 always participates in a match.
            let whole = caps.get(0).map_or("", |m| m.as_str());
            if !Self::run_programmatic_validator(rule, whole) {
                return whole.to_string();
            }

            let mut replacement = String::new();
            caps.expand(&rule.replace_with, &mut replacement);
            log_redaction_match_debug("[regex_engine]", &rule.name, whole, &replacement);

            let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
            matches.push(RedactionMatch {
                rule_name: rule.name.clone(),
                original_string: whole.to_string(),
                sanitized_string: replacement.clone(),
                start,
                end,
                sample_hash: None,
            });
            replacement
        });
        replaced.into_owned()
    }
}

impl SanitizationEngine for RegexEngine {
    fn name(&self) -> &str {
        "regex"
    }

    fn sanitize(&self, content: &str) -> Result<Sanitized> {
        let mut text = content.to_string();
        let mut matches = Vec::new();

        for rule in &self.compiled_rules.rules {
            text = Self::apply_rule(rule, &text, &mut matches);
        }

        Ok(Sanitized { text, matches })
    }
}
