// streamguard-entity/src/context/mod.rs
use daachorse::{errors::DaachorseError, DoubleArrayAhoCorasick};
extern crate alloc;
use alloc::vec::Vec;
use core::fmt;

use crate::kind::EntityKind;

/// Month names are context keywords too; a month directly in front of a
/// day number extends the date span backwards.
const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july",
    "august", "september", "october", "november", "december",
];

const KEYWORDS: &[(&str, EntityKind)] = &[
    ("ssn", EntityKind::UsSsn),
    ("social security", EntityKind::UsSsn),
    ("card", EntityKind::CreditCard),
    ("credit", EntityKind::CreditCard),
    ("visa", EntityKind::CreditCard),
    ("mastercard", EntityKind::CreditCard),
    ("amex", EntityKind::CreditCard),
    ("exp", EntityKind::CardExpiry),
    ("expiry", EntityKind::CardExpiry),
    ("expires", EntityKind::CardExpiry),
    ("expiration", EntityKind::CardExpiry),
    ("cvv", EntityKind::Cvv),
    ("cvc", EntityKind::Cvv),
    ("security code", EntityKind::Cvv),
    ("bank", EntityKind::BankNumber),
    ("account", EntityKind::BankNumber),
    ("iban", EntityKind::BankNumber),
    ("routing", EntityKind::BankNumber),
    ("dob", EntityKind::DateTime),
    ("birth", EntityKind::DateTime),
    ("born", EntityKind::DateTime),
    ("income", EntityKind::Amount),
    ("salary", EntityKind::Amount),
    ("balance", EntityKind::Amount),
    ("address", EntityKind::Location),
    ("street", EntityKind::Location),
    ("zip", EntityKind::Location),
    ("license", EntityKind::Identifier),
    ("licence", EntityKind::Identifier),
    ("passport", EntityKind::Identifier),
    ("phone", EntityKind::Phone),
    ("tel", EntityKind::Phone),
    ("mobile", EntityKind::Phone),
    ("fax", EntityKind::Phone),
    ("email", EntityKind::Email),
    ("e-mail", EntityKind::Email),
];

/// Every context keyword, the keyword table first and then the month names.
/// Automaton values index into this order.
pub fn context_keywords() -> impl Iterator<Item = &'static str> {
    KEYWORDS
        .iter()
        .map(|(keyword, _)| *keyword)
        .chain(MONTHS.iter().copied())
}

/// A keyword found in front of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHit {
    pub kind: EntityKind,
    /// Absolute offset of the keyword in the scanned text.
    pub start: usize,
    pub end: usize,
    pub is_month: bool,
}

/// Scans for keywords surrounding a candidate with word-boundary awareness.
pub struct ContextScanner {
    automaton: DoubleArrayAhoCorasick<usize>,
}

impl fmt::Debug for ContextScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextScanner")
         .field("automaton", &"<DoubleArrayAhoCorasick>")
         .finish()
    }
}

impl ContextScanner {
    /// Builds the automaton over the keyword table followed by the month names.
    pub fn new() -> Result<Self, DaachorseError> {
        let patterns: Vec<&str> = context_keywords().collect();

        let automaton = DoubleArrayAhoCorasick::new(patterns)?;
        Ok(Self { automaton })
    }

    fn resolve(&self, value: usize) -> (EntityKind, bool) {
        match KEYWORDS.get(value) {
            Some((_, kind)) => (*kind, false),
            None => (EntityKind::DateTime, true),
        }
    }

    /// Returns the keyword closest to `token_start` within the preceding
    /// `window_size` bytes. Matching is ASCII case-insensitive and a keyword
    /// must stand on word boundaries, so "exp" doesn't match "expected".
    pub fn nearest_preceding(&self, text: &[u8], token_start: usize, window_size: usize) -> Option<ContextHit> {
        if token_start == 0 { return None; }

        let start = token_start.saturating_sub(window_size);
        let window: Vec<u8> = text[start..token_start]
            .iter()
            .map(u8::to_ascii_lowercase)
            .collect();

        let mut nearest: Option<ContextHit> = None;
        for matched in self.automaton.find_overlapping_iter(&window) {
            let m_start = matched.start();
            let m_end = matched.end();

            // Word boundary check: keyword must not be glued to alphanumerics
            let prefix_ok = m_start == 0 || !window[m_start - 1].is_ascii_alphanumeric();
            let suffix_ok = m_end == window.len() || !window[m_end].is_ascii_alphanumeric();
            if !(prefix_ok && suffix_ok) {
                continue;
            }

            let (kind, is_month) = self.resolve(matched.value());
            let hit = ContextHit { kind, start: start + m_start, end: start + m_end, is_month };
            // Prefer the keyword ending last; on a tie the longer one wins.
            let closer = match nearest {
                None => true,
                Some(prev) => hit.end > prev.end || (hit.end == prev.end && hit.start < prev.start),
            };
            if closer {
                nearest = Some(hit);
            }
        }
        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> ContextScanner {
        ContextScanner::new().unwrap()
    }

    #[test]
    fn test_nearest_keyword_wins() {
        let text = b"Credit Card: 3782 8224 6310 0051 (Exp: 05/29, CVV: 1234)";
        let s = scanner();
        let exp_at = 39;
        assert_eq!(&text[exp_at..exp_at + 5], b"05/29");
        let hit = s.nearest_preceding(text, exp_at, 48).unwrap();
        assert_eq!(hit.kind, EntityKind::CardExpiry);

        let card = s.nearest_preceding(text, 13, 48).unwrap();
        assert_eq!(card.kind, EntityKind::CreditCard);
    }

    #[test]
    fn test_word_boundaries_are_respected() {
        let text = b"as expected 1234";
        assert_eq!(scanner().nearest_preceding(text, 12, 48), None);
    }

    #[test]
    fn test_month_hits_are_flagged() {
        let text = b"Born on July 3, 1979";
        let hit = scanner().nearest_preceding(text, 13, 48).unwrap();
        assert!(hit.is_month);
        assert_eq!((hit.start, hit.end), (8, 12));
    }

    #[test]
    fn test_window_limits_lookback() {
        let text = b"SSN and then a lot of filler words 234567890";
        assert!(scanner().nearest_preceding(text, 35, 10).is_none());
        assert_eq!(scanner().nearest_preceding(text, 35, 48).unwrap().kind, EntityKind::UsSsn);
    }

    #[test]
    fn test_context_keywords_list_table_then_months() {
        let keywords: Vec<&str> = context_keywords().collect();
        assert_eq!(keywords.len(), KEYWORDS.len() + MONTHS.len());
        assert_eq!(keywords[0], "ssn");
        assert_eq!(keywords.last(), Some(&"december"));
    }
}
