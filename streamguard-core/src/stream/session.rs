// streamguard-core/src/stream/session.rs
//! `StreamSession`: incremental redaction of a fragmented text stream.
//!
//! Fragments accumulate in a buffer. Once the buffer is longer than
//! `buffer_size` characters, the session looks for a cut point at least
//! `safety_margin` characters before the end, on a boundary character, whose
//! left side does not end in the beginning of a sensitive shape. Everything
//! before the cut is redacted and returned; the rest waits for more text.
//! `finalize` redacts whatever is left.
//!
//! All lengths and offsets in this module are counted in `char`s.

use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;

use crate::config::{RuleTable, SessionConfig, UnsafeCutPolicy};
use crate::engines::EngineKind;
use crate::errors::{Result, StreamGuardError};
use crate::redaction_match::{accumulate_summary, log_span_debug, RedactionSummaryItem};
use crate::redactor::Redactor;
use crate::sanitizers::compiler::{partials_for_engine, CompiledPartials};

/// Counters for one session. Reset with the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Non-empty fragments accepted.
    pub fragments: usize,
    pub chars_in: usize,
    pub chars_out: usize,
    /// Redacted spans handed back, including the final one.
    pub flushes: usize,
    /// Flush attempts that found no safe cut point.
    pub holds: usize,
}

#[derive(Debug)]
pub struct StreamSession {
    buffer: String,
    /// `buffer.chars().count()`, kept in step with the buffer.
    buffered_chars: usize,
    config: SessionConfig,
    redactor: Redactor,
    partials: Arc<CompiledPartials>,
    stats: SessionStats,
    summary: Vec<RedactionSummaryItem>,
    finished: bool,
}

impl StreamSession {
    /// Creates a session. Fails if `config` is inconsistent.
    pub fn new(redactor: Redactor, partials: Arc<CompiledPartials>, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "New stream session: engine='{}', buffer_size={}, safety_margin={}, boundary_window={}, partial_match_check={}, on_unsafe_cut={:?}",
            redactor.engine_name(),
            config.buffer_size,
            config.safety_margin,
            config.boundary_window,
            config.partial_match_check,
            config.on_unsafe_cut
        );
        Ok(Self {
            buffer: String::new(),
            buffered_chars: 0,
            config,
            redactor,
            partials,
            stats: SessionStats::default(),
            summary: Vec::new(),
            finished: false,
        })
    }

    /// Builds the engine, the partial patterns and the session settings from
    /// one rule table. Sessions that share a table should share the
    /// `Redactor` and partials instead; see [`StreamSession::new`].
    pub fn from_rule_table(table: &RuleTable, kind: EngineKind) -> Result<Self> {
        let redactor = Redactor::from_rule_table(table, kind)?;
        let partials = Arc::new(partials_for_engine(&table.partials, kind)?);
        Self::new(redactor, partials, table.stream.to_session_config())
    }

    /// Accepts the next fragment and returns whatever is now safe to emit.
    ///
    /// On a redaction error the fragment stays buffered and nothing is
    /// emitted; the next `process_chunk` or `finalize` retries the flush.
    pub fn process_chunk(&mut self, fragment: &str) -> Result<String> {
        if self.finished {
            return Err(StreamGuardError::SessionFinalized);
        }
        if fragment.is_empty() {
            return Ok(String::new());
        }
        let added = fragment.chars().count();
        self.buffer.push_str(fragment);
        self.buffered_chars += added;
        self.stats.fragments += 1;
        self.stats.chars_in += added;

        if self.buffered_chars <= self.config.buffer_size {
            return Ok(String::new());
        }

        match self.resolve_cut() {
            Some(byte_end) => self.flush_prefix(byte_end),
            None => {
                self.stats.holds += 1;
                Ok(String::new())
            }
        }
    }

    /// Redacts and returns everything still buffered, then marks the
    /// session finished. A second call returns an empty string.
    pub fn finalize(&mut self) -> Result<String> {
        if self.finished {
            return Ok(String::new());
        }
        let out = if self.buffer.is_empty() {
            String::new()
        } else {
            self.flush_prefix(self.buffer.len())?
        };
        self.finished = true;
        info!(
            "Stream session finalized: {} fragments, {} chars in, {} chars out, {} flushes, {} holds.",
            self.stats.fragments, self.stats.chars_in, self.stats.chars_out, self.stats.flushes, self.stats.holds
        );
        Ok(out)
    }

    /// Clears the buffer, statistics and summary so the session can be reused.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.buffered_chars = 0;
        self.stats = SessionStats::default();
        self.summary.clear();
        self.finished = false;
    }

    /// Text received but not yet emitted.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered_chars
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn summary(&self) -> &[RedactionSummaryItem] {
        &self.summary
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Redacts `buffer[..byte_end]`. The buffer only shrinks once the
    /// redaction succeeded.
    fn flush_prefix(&mut self, byte_end: usize) -> Result<String> {
        let sanitized = self.redactor.redact_with_matches(&self.buffer[..byte_end])?;
        self.buffered_chars -= self.buffer[..byte_end].chars().count();
        self.buffer.drain(..byte_end);

        accumulate_summary(&mut self.summary, &sanitized.matches);
        self.stats.flushes += 1;
        self.stats.chars_out += sanitized.text.chars().count();
        log_span_debug("[stream_session]", "Emitting", &sanitized.text);
        Ok(sanitized.text)
    }

    /// Chooses where to cut the buffer and returns the byte offset of the
    /// cut, or `None` to hold.
    ///
    /// Only the last `safety_margin + boundary_window` chars are visited.
    /// The candidate is `len - safety_margin`; boundaries strictly between
    /// `candidate - boundary_window` and the candidate are tried nearest
    /// first.
    fn resolve_cut(&self) -> Option<usize> {
        let len = self.buffered_chars;
        let margin = self.config.safety_margin;
        let cut = len - margin;
        let floor = cut.saturating_sub(self.config.boundary_window);

        // Walking back from the end, the `margin`-th char is the candidate.
        let mut tail = self.buffer.char_indices().rev().skip(margin - 1);
        let cut_byte = tail.next().map_or(0, |(b, _)| b);

        let mut nearest_boundary = None;
        for (offset, (byte, ch)) in tail.take(cut - floor - 1).enumerate() {
            if !self.config.boundary_chars.contains(ch) {
                continue;
            }
            let idx = cut - 1 - offset;
            nearest_boundary.get_or_insert(byte);

            if !self.config.partial_match_check {
                return Some(byte);
            }
            match self.partials.trailing_match(&self.buffer[..byte]) {
                None => return Some(byte),
                Some(name) => debug!("Boundary at char {} rejected: text before it matches '{}'.", idx, name),
            }
        }

        match self.config.on_unsafe_cut {
            UnsafeCutPolicy::Hold => {
                debug!("No safe boundary in window; holding {} chars.", len);
                None
            }
            UnsafeCutPolicy::Fallback => {
                let fallback = nearest_boundary.unwrap_or(cut_byte);
                debug!("No safe boundary in window; falling back to byte {}.", fallback);
                Some(fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartialPattern;
    use crate::sanitizers::compiler::compile_partials;

    fn session(config: SessionConfig) -> StreamSession {
        let table = RuleTable::load_default_rules().unwrap();
        let redactor = Redactor::from_rule_table(&table, EngineKind::Regex).unwrap();
        let partials = Arc::new(compile_partials(&table.partials).unwrap());
        StreamSession::new(redactor, partials, config).unwrap()
    }

    fn small(bs: usize, margin: usize) -> SessionConfig {
        SessionConfig { buffer_size: bs, safety_margin: margin, ..Default::default() }
    }

    #[test]
    fn test_empty_fragment_is_a_no_op() {
        let mut s = session(small(10, 5));
        assert_eq!(s.process_chunk("").unwrap(), "");
        assert_eq!(s.stats().fragments, 0);
        assert!(s.buffered().is_empty());
    }

    #[test]
    fn test_nothing_is_emitted_below_buffer_size() {
        let mut s = session(SessionConfig::default());
        assert_eq!(s.process_chunk("My SSN is 234-56-7890 today").unwrap(), "");
        assert_eq!(s.buffered(), "My SSN is 234-56-7890 today");
        assert_eq!(s.finalize().unwrap(), "My SSN is [REDACTED-SSN] today");
        assert!(s.buffered().is_empty());
    }

    #[test]
    fn test_cut_lands_on_a_boundary_before_the_margin() {
        let mut s = session(small(10, 5));
        // 14 chars; cut = 9, nearest boundary below it is the space at 6.
        assert_eq!(s.process_chunk("My SSN is 234-").unwrap(), "My SSN");
        assert_eq!(s.buffered(), " is 234-");
        let rest = s.process_chunk("56-7890 today").unwrap();
        let tail = s.finalize().unwrap();
        assert_eq!(format!("My SSN{}{}", rest, tail), "My SSN is [REDACTED-SSN] today");
    }

    #[test]
    fn test_partial_match_moves_the_cut_back() {
        let mut s = session(small(20, 4));
        // cut = 25; the comma at 24 follows "$1" and is rejected, the space at 21 is taken.
        let out = s.process_chunk("Invoice is due Amount $1,2 ok").unwrap();
        assert_eq!(out, "Invoice is due Amount");
        assert_eq!(s.finalize().unwrap(), " [REDACTED-AMOUNT] ok");
    }

    #[test]
    fn test_basic_variant_takes_the_first_boundary() {
        let config = SessionConfig { partial_match_check: false, ..small(20, 4) };
        let mut s = session(config);
        let out = s.process_chunk("Invoice is due Amount $1,2 ok").unwrap();
        // The amount is split at its thousands separator.
        assert_eq!(out, "Invoice is due Amount [REDACTED-AMOUNT]");
        assert_eq!(s.finalize().unwrap(), ",2 ok");
    }

    #[test]
    fn test_hold_and_fallback_policies() {
        let text = "Credit Card: 3782 8224 6310 0051 (Exp: 05/29, CVV: 1234) ok";
        let config = small(50, 20);

        let mut hold = session(SessionConfig { on_unsafe_cut: UnsafeCutPolicy::Hold, ..config.clone() });
        assert_eq!(hold.process_chunk("C").unwrap(), "");
        assert_eq!(hold.process_chunk(&text[1..]).unwrap(), "");
        assert_eq!(hold.buffered(), text);
        assert_eq!(hold.stats().holds, 1);
        assert_eq!(
            hold.finalize().unwrap(),
            "Credit Card: [REDACTED-CREDIT-CARD] (Exp: [REDACTED], CVV: [REDACTED]) ok"
        );

        let mut fallback = session(config);
        assert_eq!(fallback.process_chunk("C").unwrap(), "");
        assert_eq!(
            fallback.process_chunk(&text[1..]).unwrap(),
            "Credit Card: [REDACTED-CREDIT-CARD] (Exp:"
        );
        // The expiry label went out with the first part, so the date survives.
        assert_eq!(fallback.finalize().unwrap(), " 05/29, CVV: [REDACTED]) ok");
    }

    #[test]
    fn test_text_without_boundaries_is_cut_at_the_margin() {
        let text = "x".repeat(300);
        for partial_match_check in [true, false] {
            let mut s = session(SessionConfig { partial_match_check, ..Default::default() });
            assert_eq!(s.process_chunk(&text).unwrap().len(), 280);
            assert_eq!(s.buffered_len(), 20);
            assert_eq!(s.stats().holds, 0);
        }

        // Every boundary after a number followed by words looks like a house number.
        let mut prose = session(SessionConfig::default());
        let text_after_number = format!("I counted 3 {}", "apples and pears ".repeat(21));
        assert!(!prose.process_chunk(&text_after_number).unwrap().is_empty());
        assert!(prose.buffered_len() < 40);

        let mut hold = session(SessionConfig { on_unsafe_cut: UnsafeCutPolicy::Hold, ..Default::default() });
        assert_eq!(hold.process_chunk(&text).unwrap(), "");
        assert_eq!(hold.buffered_len(), 300);
        assert_eq!(hold.stats().holds, 1);
    }

    #[test]
    fn test_wide_chars_flow_before_finalize() {
        let mut s = session(SessionConfig::default());
        let mut out = String::new();
        for _ in 0..240 {
            out.push_str(&s.process_chunk("界").unwrap());
        }
        // Two flushes of 81 chars, at 101 buffered chars each.
        assert_eq!(out.chars().count(), 162);
        assert_eq!(s.buffered_len(), 78);
        out.push_str(&s.finalize().unwrap());
        assert_eq!(out, "界".repeat(240));
    }

    #[test]
    fn test_address_split_after_house_number_is_caught() {
        let text = "I live at 12 Main Street now, thanks";
        let whole = "I live at [REDACTED-ADDRESS] now, thanks";
        for policy in [UnsafeCutPolicy::Hold, UnsafeCutPolicy::Fallback] {
            for at in 0..=text.len() {
                let mut s = session(SessionConfig { on_unsafe_cut: policy, ..small(10, 5) });
                let mut out = s.process_chunk(&text[..at]).unwrap();
                out.push_str(&s.process_chunk(&text[at..]).unwrap());
                out.push_str(&s.finalize().unwrap());
                assert_eq!(out, whole, "split at {at} with {policy:?}");
            }
        }
    }

    #[test]
    fn test_finalize_then_process_is_rejected_until_reset() {
        let mut s = session(small(10, 5));
        s.process_chunk("hello").unwrap();
        assert_eq!(s.finalize().unwrap(), "hello");
        assert_eq!(s.finalize().unwrap(), "");
        assert!(matches!(s.process_chunk("more"), Err(StreamGuardError::SessionFinalized)));

        s.reset();
        assert!(!s.is_finished());
        assert_eq!(s.stats(), &SessionStats::default());
        assert_eq!(s.process_chunk("again").unwrap(), "");
        assert_eq!(s.finalize().unwrap(), "again");
    }

    #[test]
    fn test_misconfigured_session_cannot_be_built() {
        let table = RuleTable::load_default_rules().unwrap();
        let redactor = Redactor::from_rule_table(&table, EngineKind::Regex).unwrap();
        let partials = Arc::new(CompiledPartials::default());
        let err = StreamSession::new(redactor, partials, small(10, 10)).unwrap_err();
        assert!(matches!(err, StreamGuardError::InvalidSessionConfig { .. }));
    }

    #[test]
    fn test_multibyte_text_is_cut_on_char_boundaries() {
        let mut s = session(small(10, 3));
        let out = s.process_chunk("héllo wörld ünïcode").unwrap();
        let rest = s.finalize().unwrap();
        assert_eq!(format!("{}{}", out, rest), "héllo wörld ünïcode");
        assert!(!out.is_empty());
    }

    #[test]
    fn test_summary_tracks_rules_across_flushes() {
        let mut s = session(small(30, 10));
        let mut out = String::new();
        for frag in ["SSN 234-56-7890 is on file. ", "Backup SSN 345-67-8901 noted. ", "Card 4111 1111 1111 1111 end"] {
            out.push_str(&s.process_chunk(frag).unwrap());
        }
        out.push_str(&s.finalize().unwrap());
        assert_eq!(
            out,
            "SSN [REDACTED-SSN] is on file. Backup SSN [REDACTED-SSN] noted. Card [REDACTED-CREDIT-CARD] end"
        );
        assert_eq!(s.stats().flushes, 3);

        let summary: Vec<(&str, usize)> = s.summary().iter().map(|i| (i.rule_name.as_str(), i.occurrences)).collect();
        assert_eq!(summary, vec![("ssn", 2), ("credit_card", 1)]);
    }

    #[test]
    fn test_custom_partials_are_honoured() {
        let table = RuleTable::load_default_rules().unwrap();
        let redactor = Redactor::from_rule_table(&table, EngineKind::Regex).unwrap();
        let partials = Arc::new(
            compile_partials(&[PartialPattern { name: "secret_word".into(), pattern: r"\bsec(?:r(?:e(?:t)?)?)?$".into() }])
                .unwrap(),
        );
        let config = SessionConfig { buffer_size: 10, safety_margin: 2, ..Default::default() };
        let mut s = StreamSession::new(redactor, partials, config).unwrap();
        // cut = 9; the space at 7 follows "the sec" and is rejected, the one at 3 is taken.
        assert_eq!(s.process_chunk("the sec ret").unwrap(), "the");
    }
}
