//! Configuration management for `streamguard-core`.
//!
//! This module defines the rule table (ordered pattern rules plus the
//! partial patterns used to guard cut points), the engine settings and the
//! per-session stream settings. It handles YAML (de)serialization and
//! provides utilities for loading, merging, filtering and validating them.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::StreamGuardError;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Characters a cut point may land on by default.
pub const DEFAULT_BOUNDARY_CHARS: &str = " \n\t.,;:!?";

/// Represents a single redaction rule used by the regex engine.
///
/// The position of a rule in [`RuleTable::rules`] is its priority: rules are
/// applied one after another, each on the output of the previous ones.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternRule {
    /// Unique identifier for the rule (e.g., "ssn").
    pub name: String,
    /// Human-readable description of what the rule targets.
    pub description: Option<String>,
    /// The regex pattern string.
    pub pattern: String,
    /// Replacement text. `$1`-style references expand to capture groups,
    /// so `$1[REDACTED]` keeps a field label such as `CVV: `.
    pub replace_with: String,
    pub case_insensitive: bool,
    /// If true, enables multiline mode for the regex engine.
    pub multiline: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
    /// If true, the rule is disabled unless explicitly enabled.
    pub opt_in: bool,
    /// If true, a checksum/structure validator can veto a regex match.
    pub programmatic_validation: bool,
    /// Security severity level (e.g., "high", "medium").
    pub severity: Option<String>,
    /// Metadata tags for categorization.
    pub tags: Option<Vec<String>>,
}

impl Default for PatternRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            pattern: String::new(),
            replace_with: "[REDACTED]".to_string(),
            case_insensitive: true,
            multiline: false,
            enabled: None,
            opt_in: false,
            programmatic_validation: false,
            severity: None,
            tags: None,
        }
    }
}

impl PatternRule {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// The prefix of a sensitive shape, anchored at the end of the text
/// (e.g. `\d{3}[-\s]?\d{0,2}$` for the first half of an SSN). A cut point
/// whose left side matches one of these is unsafe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PartialPattern {
    pub name: String,
    pub pattern: String,
}

/// Configuration settings specific to the entity engine.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct EntityConfig {
    /// The confidence threshold for reporting an entity (default: 0.5).
    pub threshold: Option<f64>,
    /// How many bytes before a candidate are searched for keywords (default: 48).
    pub context_window: Option<usize>,
}

/// Container for all engine-specific configurations.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub entity: EntityConfig,
}

/// What a session does when every boundary in the search window is unsafe,
/// or there is no boundary at all.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsafeCutPolicy {
    /// Cut at the nearest boundary anyway, or at `len - safety_margin`
    /// when the window has none. Best effort; may split a match.
    #[default]
    Fallback,
    /// Emit nothing and keep the whole buffer until more context arrives.
    /// The buffer is unbounded until a safe boundary shows up or the
    /// stream is finalized.
    Hold,
}

/// The YAML `stream:` section. Every field is optional so a user file can
/// override a single setting.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct StreamConfig {
    pub buffer_size: Option<usize>,
    pub safety_margin: Option<usize>,
    pub boundary_window: Option<usize>,
    pub boundary_chars: Option<String>,
    pub partial_match_check: Option<bool>,
    pub on_unsafe_cut: Option<UnsafeCutPolicy>,
}

impl StreamConfig {
    /// Resolves the optional fields against the built-in defaults.
    pub fn to_session_config(&self) -> SessionConfig {
        let d = SessionConfig::default();
        SessionConfig {
            buffer_size: self.buffer_size.unwrap_or(d.buffer_size),
            safety_margin: self.safety_margin.unwrap_or(d.safety_margin),
            boundary_window: self.boundary_window.unwrap_or(d.boundary_window),
            boundary_chars: self.boundary_chars.clone().unwrap_or(d.boundary_chars),
            partial_match_check: self.partial_match_check.unwrap_or(d.partial_match_check),
            on_unsafe_cut: self.on_unsafe_cut.unwrap_or(d.on_unsafe_cut),
        }
    }
}

/// Fully resolved settings for one stream session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Buffered characters above which a flush is attempted.
    pub buffer_size: usize,
    /// Trailing characters always held back on a flush.
    pub safety_margin: usize,
    /// How far back from `len - safety_margin` a boundary is searched for.
    pub boundary_window: usize,
    pub boundary_chars: String,
    /// Reject boundaries whose left side ends in a partial pattern.
    pub partial_match_check: bool,
    pub on_unsafe_cut: UnsafeCutPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 100,
            safety_margin: 20,
            boundary_window: 20,
            boundary_chars: DEFAULT_BOUNDARY_CHARS.to_string(),
            partial_match_check: true,
            on_unsafe_cut: UnsafeCutPolicy::Fallback,
        }
    }
}

impl SessionConfig {
    /// Checks the relationships between the settings.
    pub fn validate(&self) -> Result<(), StreamGuardError> {
        let reason = if self.buffer_size == 0 {
            Some("buffer_size must be greater than zero")
        } else if self.safety_margin == 0 {
            Some("safety_margin must be greater than zero")
        } else if self.safety_margin >= self.buffer_size {
            Some("safety_margin must be smaller than buffer_size")
        } else if self.boundary_window == 0 {
            Some("boundary_window must be greater than zero")
        } else if self.boundary_chars.is_empty() {
            Some("boundary_chars must not be empty")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StreamGuardError::InvalidSessionConfig {
                buffer_size: self.buffer_size,
                safety_margin: self.safety_margin,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Represents the top-level configuration structure for StreamGuard.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuleTable {
    /// Regex-based redaction rules, in application order.
    #[serde(default)]
    pub rules: Vec<PatternRule>,
    /// End-anchored prefixes of sensitive shapes, used to guard cut points.
    #[serde(default)]
    pub partials: Vec<PartialPattern>,
    /// Engine-specific settings.
    #[serde(default)]
    pub engines: EngineConfig,
    /// Stream session settings.
    #[serde(default)]
    pub stream: StreamConfig,
}

impl RuleTable {
    /// Reads and validates a user rule table. Every rule and partial pattern
    /// is checked before anything is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading rule table {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read rule table {}", path.display()))?;
        let table: RuleTable = serde_yml::from_str(&text)
            .with_context(|| format!("Rule table {} is not valid YAML for this schema", path.display()))?;

        validate_rules(&table.rules)?;
        validate_partials(&table.partials)?;
        info!(
            "{}: {} rules, {} partial patterns.",
            path.display(),
            table.rules.len(),
            table.partials.len()
        );
        Ok(table)
    }

    /// The built-in table compiled into the binary.
    pub fn load_default_rules() -> Result<Self> {
        let table: RuleTable = serde_yml::from_str(include_str!("../config/default_rules.yaml"))
            .context("Built-in rule table does not parse")?;
        debug!("Built-in table has {} rules.", table.rules.len());
        Ok(table)
    }

    /// Drops rules named in `disable_rules`, and opt-in rules not named in
    /// `enable_rules`. Disabling wins when a rule is in both lists. Unknown
    /// names are reported and otherwise ignored.
    pub fn set_active_rules(&mut self, enable_rules: &[String], disable_rules: &[String]) {
        let known: HashSet<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();
        for (flag, names) in [("enable", enable_rules), ("disable", disable_rules)] {
            for name in names.iter().filter(|n| !known.contains(n.as_str())) {
                warn!("--{} names unknown rule '{}'; ignoring it.", flag, name);
            }
        }

        let before = self.rules.len();
        self.rules.retain(|rule| {
            let named = |list: &[String]| list.iter().any(|n| *n == rule.name);
            !named(disable_rules) && (!rule.opt_in || named(enable_rules))
        });
        debug!("Active rules: {} of {}.", self.rules.len(), before);
    }

    /// Rules that will actually be compiled, in priority order.
    pub fn active_rules(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter().filter(|r| r.is_enabled())
    }
}

/// Merges user-defined rules and settings with defaults.
///
/// A user rule replaces the default rule of the same name at the default's
/// position; new user rules are appended after the defaults in the order
/// they were declared. Partial patterns merge the same way. Engine and
/// stream settings override field by field.
pub fn merge_rules(default_table: RuleTable, user_table: Option<RuleTable>) -> RuleTable {
    debug!("merge_rules called. Initial default rules count: {}", default_table.rules.len());

    let Some(user) = user_table else {
        return default_table;
    };
    debug!("User config provided. Merging {} user rules.", user.rules.len());

    let rules = merge_by_name(default_table.rules, user.rules, |r| r.name.as_str());
    let partials = merge_by_name(default_table.partials, user.partials, |p| p.name.as_str());

    let mut engines = default_table.engines;
    if let Some(threshold) = user.engines.entity.threshold {
        debug!("Overriding entity threshold with user value: {}", threshold);
        engines.entity.threshold = Some(threshold);
    }
    if let Some(window) = user.engines.entity.context_window {
        debug!("Overriding entity context window with user value: {}", window);
        engines.entity.context_window = Some(window);
    }

    let mut stream = default_table.stream;
    let u = user.stream;
    stream.buffer_size = u.buffer_size.or(stream.buffer_size);
    stream.safety_margin = u.safety_margin.or(stream.safety_margin);
    stream.boundary_window = u.boundary_window.or(stream.boundary_window);
    stream.boundary_chars = u.boundary_chars.or(stream.boundary_chars);
    stream.partial_match_check = u.partial_match_check.or(stream.partial_match_check);
    stream.on_unsafe_cut = u.on_unsafe_cut.or(stream.on_unsafe_cut);

    debug!("Final total rules after merge: {}", rules.len());

    RuleTable { rules, partials, engines, stream }
}

fn merge_by_name<T>(defaults: Vec<T>, overrides: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    let mut merged = defaults;
    for item in overrides {
        match merged.iter().position(|existing| name(existing) == name(&item)) {
            Some(idx) => merged[idx] = item,
            None => merged.push(item),
        }
    }
    merged
}

/// Returns the `$n` / `${n}` group numbers referenced by a replacement string.
fn referenced_groups(replace_with: &str) -> Vec<usize> {
    let bytes = replace_with.as_bytes();
    let mut groups = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let braced = bytes.get(i + 1) == Some(&b'{');
        let digits_start = if braced { i + 2 } else { i + 1 };
        let mut j = digits_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            if let Ok(n) = replace_with[digits_start..j].parse::<usize>() {
                groups.push(n);
            }
        }
        i = j.max(i + 1);
    }
    groups
}

/// Checks a rule list and reports every problem at once: missing or
/// repeated names, empty or oversized patterns, regexes that do not compile,
/// and `$N` references to groups the pattern does not have.
pub fn validate_rules(rules: &[PatternRule]) -> Result<()> {
    let mut seen = HashSet::new();
    let mut problems = Vec::new();

    for rule in rules {
        let name = rule.name.as_str();
        if name.is_empty() {
            problems.push("a rule is missing its `name`".to_string());
        } else if !seen.insert(name) {
            problems.push(format!("rule name '{}' is used more than once", name));
        }

        if rule.pattern.is_empty() {
            problems.push(format!("rule '{}' has no `pattern`", name));
            continue;
        }
        if rule.pattern.len() > MAX_PATTERN_LENGTH {
            problems.push(format!(
                "rule '{}': pattern is {} bytes, the limit is {}",
                name,
                rule.pattern.len(),
                MAX_PATTERN_LENGTH
            ));
            continue;
        }

        let compiled = RegexBuilder::new(&rule.pattern)
            .case_insensitive(rule.case_insensitive)
            .build();
        let regex = match compiled {
            Ok(regex) => regex,
            Err(e) => {
                problems.push(format!("rule '{}': pattern does not compile: {}", name, e));
                continue;
            }
        };

        let groups = regex.captures_len() - 1;
        for group in referenced_groups(&rule.replace_with).into_iter().filter(|g| *g > groups) {
            problems.push(format!(
                "rule '{}': `replace_with` uses ${} but the pattern has {} capture group(s)",
                name, group, groups
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Invalid rules:\n{}", problems.join("\n")))
    }
}

/// Validates partial patterns: unique names, compiling regexes, and an
/// end anchor so they only ever look at the tail of the text.
pub fn validate_partials(partials: &[PartialPattern]) -> Result<()> {
    let mut names = HashSet::new();
    let mut errors = Vec::new();

    for partial in partials {
        if partial.name.is_empty() {
            errors.push("A partial pattern has an empty `name` field.".to_string());
        } else if !names.insert(partial.name.as_str()) {
            errors.push(format!("Duplicate partial pattern name found: '{}'.", partial.name));
        }
        if !partial.pattern.ends_with('$') {
            errors.push(format!("Partial pattern '{}' must end with '$'.", partial.name));
        }
        if let Err(e) = RegexBuilder::new(&partial.pattern).build() {
            errors.push(format!("Partial pattern '{}' is invalid: {}", partial.name, e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Partial pattern validation failed:\n{}", errors.join("\n")))
    }
}
