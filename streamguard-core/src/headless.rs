// streamguard-core/src/headless.rs
//! `headless.rs`
//! Convenience wrappers for using the core engines without a UI.
//! Provides one-shot redaction of a string, a driver that pushes an
//! iterator of fragments through a stream session, and a detection-only
//! scan that reports per-rule counts.

use crate::config::RuleTable;
use crate::engines::{build_engine, EngineKind};
use crate::errors::Result;
use crate::redaction_match::{summarize, RedactionSummaryItem};
use crate::redactor::Redactor;
use crate::stream::session::StreamSession;

/// Fully redacts an input string with the selected engine.
/// This function is the primary entry point for non-streaming use.
pub fn headless_redact_string(table: &RuleTable, engine: EngineKind, content: &str) -> Result<String> {
    Redactor::from_rule_table(table, engine)?.redact(content)
}

/// Pushes every fragment through `session`, finalizes it, and returns the
/// concatenated output.
pub fn headless_redact_fragments<I, S>(session: &mut StreamSession, fragments: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for fragment in fragments {
        out.push_str(&session.process_chunk(fragment.as_ref())?);
    }
    out.push_str(&session.finalize()?);
    Ok(out)
}

/// Detects sensitive spans without redacting and summarizes them per rule.
pub fn headless_scan(table: &RuleTable, engine: EngineKind, content: &str) -> Result<Vec<RedactionSummaryItem>> {
    let engine = build_engine(engine, table)?;
    let matches = engine.detect(content)?;
    Ok(summarize(&matches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternRule;
    use anyhow::Result;

    fn email_table() -> RuleTable {
        RuleTable {
            rules: vec![PatternRule {
                name: "email".to_string(),
                pattern: "([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\\.[A-Za-z]{2,})".to_string(),
                replace_with: "[EMAIL]".to_string(),
                description: Some("Matches email addresses".to_string()),
                severity: Some("high".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_headless_redact_string_regex() -> Result<()> {
        let content = "My email is test@example.com, and another is another@example.net.";
        let sanitized = headless_redact_string(&email_table(), EngineKind::Regex, content)?;
        assert_eq!(sanitized, "My email is [EMAIL], and another is [EMAIL].");
        Ok(())
    }

    #[test]
    fn test_headless_redact_string_entity() -> Result<()> {
        let content = "SSN 234-56-7890, mail test@example.com";
        let sanitized = headless_redact_string(&RuleTable::default(), EngineKind::Entity, content)?;
        assert_eq!(sanitized, "SSN <US_SSN>, mail test@example.com");
        Ok(())
    }

    #[test]
    fn test_headless_fragments_match_one_shot() -> Result<()> {
        let mut table = RuleTable::load_default_rules()?;
        table.stream.buffer_size = Some(20);
        table.stream.safety_margin = Some(8);
        let text = "Exp: 05/29, CVV: 1234 and SSN 234-56-7890 on July 3, 1979.";
        let one_shot = headless_redact_string(&table, EngineKind::Regex, text)?;

        let mut session = StreamSession::from_rule_table(&table, EngineKind::Regex)?;
        let chars: Vec<char> = text.chars().collect();
        let fragments: Vec<String> = chars.chunks(3).map(|c| c.iter().collect()).collect();
        assert_eq!(one_shot, "Exp: [REDACTED], CVV: [REDACTED] and SSN [REDACTED-SSN] on [REDACTED-DATE].");
        assert_eq!(headless_redact_fragments(&mut session, &fragments)?, one_shot);
        Ok(())
    }

    #[test]
    fn test_headless_scan_reports_counts_only() -> Result<()> {
        let table = RuleTable::load_default_rules()?;
        let summary = headless_scan(&table, EngineKind::Regex, "SSN 234-56-7890 and 345-67-8901")?;
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].rule_name, "ssn");
        assert_eq!(summary[0].occurrences, 2);
        Ok(())
    }
}
