// streamguard-core/src/redaction_match.rs
//! Match records produced by the engines, the per-rule summary built from
//! them, and the masking applied before matched text reaches a debug log.
//!
//! Matched text is only written to logs verbatim when
//! `STREAMGUARD_ALLOW_DEBUG_PII=true` is set in the environment.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

lazy_static! {
    static ref LOG_RAW_MATCHES: bool = std::env::var("STREAMGUARD_ALLOW_DEBUG_PII")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
}

/// One span an engine replaced.
///
/// `start` and `end` are byte offsets into the text the rule ran over. For
/// the regex engine that is the output of every rule ahead of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RedactionMatch {
    pub rule_name: String,
    pub original_string: String,
    pub sanitized_string: String,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub sample_hash: Option<String>,
}

impl RedactionMatch {
    /// The stored hash, or one derived from the rule and matched text.
    fn hash(&self) -> String {
        self.sample_hash
            .clone()
            .unwrap_or_else(|| canonical_sample_hash(&self.rule_name, &self.original_string))
    }
}

/// Per-rule totals. Holds hashes of the matched text, never the text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionSummaryItem {
    pub rule_name: String,
    pub occurrences: usize,
    pub sample_hashes: Vec<String>,
}

impl RedactionSummaryItem {
    fn empty(rule_name: &str) -> Self {
        Self {
            rule_name: rule_name.to_owned(),
            occurrences: 0,
            sample_hashes: Vec::new(),
        }
    }

    fn record(&mut self, hash: String) {
        self.occurrences += 1;
        if !self.sample_hashes.contains(&hash) {
            self.sample_hashes.push(hash);
        }
    }
}

/// Adds `matches` to `summary`. Rules keep the order they were first seen in.
pub fn accumulate_summary(summary: &mut Vec<RedactionSummaryItem>, matches: &[RedactionMatch]) {
    for m in matches {
        let idx = match summary.iter().position(|item| item.rule_name == m.rule_name) {
            Some(idx) => idx,
            None => {
                summary.push(RedactionSummaryItem::empty(&m.rule_name));
                summary.len() - 1
            }
        };
        summary[idx].record(m.hash());
    }
}

/// Summary of a single batch of matches.
pub fn summarize(matches: &[RedactionMatch]) -> Vec<RedactionSummaryItem> {
    let mut summary = Vec::new();
    accumulate_summary(&mut summary, matches);
    summary
}

/// Placeholder used in logs instead of matched text. Short values reveal
/// nothing, longer ones only their length.
pub fn redact_sensitive(s: &str) -> String {
    match s.len() {
        0..=8 => "[REDACTED]".to_owned(),
        n => format!("[REDACTED: {} chars]", n),
    }
}

fn loggable(text: &str) -> String {
    if *LOG_RAW_MATCHES {
        text.to_owned()
    } else {
        redact_sensitive(text)
    }
}

/// Debug line for one replacement made by an engine.
pub fn log_redaction_match_debug(source: &str, rule_name: &str, original: &str, replacement: &str) {
    debug!(
        "{} rule '{}' replaced '{}' with '{}'",
        source,
        rule_name,
        loggable(original),
        replacement
    );
}

/// Debug line for text a session is emitting or holding back.
pub fn log_span_debug(source: &str, what: &str, span: &str) {
    debug!("{} {}: '{}'", source, what, loggable(span));
}

/// SHA-256 over `rule_id:` plus the snippet lowercased with runs of
/// whitespace collapsed, hex encoded.
pub fn canonical_sample_hash(rule_id: &str, snippet: &str) -> String {
    let folded = snippet.to_lowercase();
    let words: Vec<&str> = folded.split_whitespace().collect();

    let mut hasher = Sha256::new();
    hasher.update(rule_id.as_bytes());
    hasher.update(b":");
    hasher.update(words.join(" ").as_bytes());
    hex::encode(hasher.finalize())
}
