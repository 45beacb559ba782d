//! compiler.rs - Compiles a rule table into ready-to-run regexes.
//!
//! Compilation is explicit: callers hold the result in an `Arc` and share
//! it between sessions. There is no process-wide cache, so several rule
//! tables can live side by side in one process.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::config::{PartialPattern, PatternRule, MAX_PATTERN_LENGTH};
use crate::engines::EngineKind;
use crate::errors::StreamGuardError;

/// Upper bound on the compiled size of a single regex.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Name reported when a cut would leave a context keyword without its value.
pub const KEYWORD_PARTIAL: &str = "context_keyword";

/// Represents a single compiled redaction rule.
#[derive(Debug)]
pub struct CompiledRule {
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    /// The replacement text, with `$n` references still unexpanded.
    pub replace_with: String,
    /// The unique name of the redaction rule.
    pub name: String,
    /// A flag indicating if this rule requires additional programmatic validation.
    pub programmatic_validation: bool,
}

/// The enabled rules of a table, compiled, in application order.
#[derive(Debug, Default)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
}

impl CompiledRules {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A compiled, end-anchored partial pattern.
#[derive(Debug)]
pub struct CompiledPartial {
    pub name: String,
    pub regex: Regex,
}

/// The partial patterns of a table, compiled.
#[derive(Debug, Default)]
pub struct CompiledPartials {
    pub partials: Vec<CompiledPartial>,
}

impl CompiledPartials {
    /// Returns the name of the first partial pattern matching the end of
    /// `text`, if any.
    pub fn trailing_match(&self, text: &str) -> Option<&str> {
        self.partials
            .iter()
            .find(|p| p.regex.is_match(text))
            .map(|p| p.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }
}

fn build_regex(
    name: &str,
    pattern: &str,
    case_insensitive: bool,
    multiline: bool,
) -> Result<Regex, StreamGuardError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(StreamGuardError::PatternLengthExceeded(
            name.to_string(),
            pattern.len(),
            MAX_PATTERN_LENGTH,
        ));
    }

    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .multi_line(multiline)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| StreamGuardError::RuleCompilationError(name.to_string(), e))
}

/// Reports one error as itself and several as a single table error.
fn collect_errors(mut errors: Vec<StreamGuardError>) -> Result<(), StreamGuardError> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        n => {
            let message = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<String>>()
                .join("\n");
            Err(StreamGuardError::InvalidRuleTable(format!(
                "Failed to compile {} rule(s):\n{}",
                n, message
            )))
        }
    }
}

/// Compiles the enabled rules, preserving their order.
pub fn compile_rules(rules: &[PatternRule]) -> Result<CompiledRules, StreamGuardError> {
    debug!("Starting compilation of {} rules.", rules.len());

    let mut compiled_rules = Vec::with_capacity(rules.len());
    let mut compilation_errors = Vec::new();

    for rule in rules {
        if !rule.is_enabled() {
            debug!("Skipping disabled rule '{}'.", rule.name);
            continue;
        }

        match build_regex(&rule.name, &rule.pattern, rule.case_insensitive, rule.multiline) {
            Ok(regex) => {
                log::debug!(
                    target: "streamguard_core::sanitizer",
                    "Rule '{}' compiled successfully.",
                    &rule.name
                );
                compiled_rules.push(CompiledRule {
                    regex,
                    replace_with: rule.replace_with.clone(),
                    name: rule.name.clone(),
                    programmatic_validation: rule.programmatic_validation,
                });
            }
            Err(e) => compilation_errors.push(e),
        }
    }

    collect_errors(compilation_errors)?;
    debug!("Finished compiling rules. Total compiled: {}.", compiled_rules.len());
    Ok(CompiledRules { rules: compiled_rules })
}

/// Compiles partial patterns. They are always case-insensitive.
pub fn compile_partials(partials: &[PartialPattern]) -> Result<CompiledPartials, StreamGuardError> {
    let mut compiled = Vec::with_capacity(partials.len());
    let mut compilation_errors = Vec::new();

    for partial in partials {
        if !partial.pattern.ends_with('$') {
            compilation_errors.push(StreamGuardError::InvalidRuleTable(format!(
                "partial pattern '{}' is not anchored at the end of the text",
                partial.name
            )));
            continue;
        }
        match build_regex(&partial.name, &partial.pattern, true, false) {
            Ok(regex) => compiled.push(CompiledPartial { name: partial.name.clone(), regex }),
            Err(e) => compilation_errors.push(e),
        }
    }

    collect_errors(compilation_errors)?;
    debug!("Compiled {} partial patterns.", compiled.len());
    Ok(CompiledPartials { partials: compiled })
}

/// Builds the partial that flags text ending in a context keyword, optionally
/// followed by up to two short words ("Account: ", "passport number ").
/// The keyword list is generated, so the pattern length limit does not apply.
pub fn keyword_partial<'a, I>(keywords: I) -> Result<CompiledPartial, StreamGuardError>
where
    I: IntoIterator<Item = &'a str>,
{
    let alternation = keywords
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<String>>()
        .join("|");
    let pattern = format!(
        r"\b(?:{})\b(?:[^A-Za-z0-9]+[A-Za-z]{{1,12}}){{0,2}}[^A-Za-z0-9]*$",
        alternation
    );

    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| StreamGuardError::RuleCompilationError(KEYWORD_PARTIAL.to_string(), e))?;
    Ok(CompiledPartial { name: KEYWORD_PARTIAL.to_string(), regex })
}

/// Compiles the partials a session on `kind` checks cuts against. The entity
/// backend scores a value by the keyword in front of it, so for the entity
/// and hybrid backends a cut must not separate a keyword from what follows.
pub fn partials_for_engine(
    partials: &[PartialPattern],
    kind: EngineKind,
) -> Result<CompiledPartials, StreamGuardError> {
    let mut compiled = compile_partials(partials)?;
    if kind != EngineKind::Regex {
        compiled
            .partials
            .push(keyword_partial(streamguard_entity::context::context_keywords())?);
    }
    Ok(compiled)
}
