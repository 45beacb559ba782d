// streamguard/src/ui/redaction_summary.rs
//! Human-readable redaction summaries and session statistics.
//!
//! Only rule names, counts and sample hashes are printed; matched text never
//! reaches this module.

use std::io::{self, Write};

use streamguard_core::{RedactionSummaryItem, SessionStats};

use super::output_format::write_styled;
use super::theme::{ThemeEntry, ThemeMap};

/// Prints one line per rule, in the order the rules first matched.
pub fn print_summary<W: Write + ?Sized>(
    summary: &[RedactionSummaryItem],
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    write_styled(writer, "\n--- Redaction Summary ---", ThemeEntry::Header, theme, supports_color)?;
    writeln!(writer)?;

    if summary.is_empty() {
        write_styled(writer, "No redactions applied.", ThemeEntry::Info, theme, supports_color)?;
        return writeln!(writer);
    }

    for item in summary {
        write_styled(writer, &item.rule_name, ThemeEntry::SummaryRuleName, theme, supports_color)?;
        write!(writer, " (")?;
        write_styled(writer, &item.occurrences.to_string(), ThemeEntry::SummaryOccurrences, theme, supports_color)?;
        let noun = if item.occurrences == 1 { "occurrence" } else { "occurrences" };
        writeln!(writer, " {})", noun)?;
    }
    Ok(())
}

/// Prints the counters of a finished session.
pub fn print_session_stats<W: Write + ?Sized>(
    stats: &SessionStats,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let line = format!(
        "Session: {} fragments, {} chars in, {} chars out, {} flushes, {} holds.",
        stats.fragments, stats.chars_in, stats.chars_out, stats.flushes, stats.holds
    );
    write_styled(writer, &line, ThemeEntry::Info, theme, supports_color)?;
    writeln!(writer)
}

/// Total detections across all rules.
pub fn total_occurrences(summary: &[RedactionSummaryItem]) -> usize {
    summary.iter().map(|item| item.occurrences).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;

    fn item(rule_name: &str, occurrences: usize) -> RedactionSummaryItem {
        RedactionSummaryItem { rule_name: rule_name.to_string(), occurrences, sample_hashes: Vec::new() }
    }

    #[test]
    fn test_summary_lists_rules_in_order() {
        let mut out = Vec::new();
        let summary = vec![item("ssn", 2), item("credit_card", 1)];
        print_summary(&summary, &mut out, &ThemeStyle::default_theme_map(), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\n--- Redaction Summary ---\nssn (2 occurrences)\ncredit_card (1 occurrence)\n"
        );
        assert_eq!(total_occurrences(&summary), 3);
    }

    #[test]
    fn test_empty_summary() {
        let mut out = Vec::new();
        print_summary(&[], &mut out, &ThemeStyle::default_theme_map(), false).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No redactions applied."));
    }
}
