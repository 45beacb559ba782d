// streamguard-entity/src/scanner/mod.rs
//! Candidate extraction.
//!
//! The scanner walks the text once and yields the spans worth scoring:
//! numeric runs (digit groups joined by single separators, optionally
//! `$`-prefixed) and alphanumeric tokens such as licence numbers. It does
//! not decide what a candidate *is*; that is the engine's job.

extern crate alloc;
use alloc::vec::Vec;

/// Separators allowed between two digit groups of one numeric candidate.
const GROUP_SEPARATORS: &[u8] = b"- /,.";

/// The structural shape of a candidate span.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Digit groups joined by separators, e.g. `234-56-7890` or `$112,800`.
    Numeric {
        /// Length of every digit group, in order.
        groups: Vec<usize>,
        /// The separator byte between group `n` and `n + 1`.
        separators: Vec<u8>,
        /// Whether the run was introduced by a `$`.
        currency: bool,
    },
    /// A token mixing letters and digits, e.g. `CA-DL-C7394856`.
    AlphaNumeric {
        letters: usize,
        digits: usize,
        has_at: bool,
        has_dot: bool,
    },
}

/// A span of the input that may hold an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub start: usize,
    pub end: usize,
    pub shape: Shape,
}

impl Candidate {
    /// Total number of ASCII digits in the candidate.
    pub fn digit_count(&self) -> usize {
        match &self.shape {
            Shape::Numeric { groups, .. } => groups.iter().sum(),
            Shape::AlphaNumeric { digits, .. } => *digits,
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_token_byte(b: u8) -> bool {
    is_word_byte(b) || matches!(b, b'-' | b'@' | b'.')
}

/// Scans `text` and returns all candidates ordered by start offset.
pub fn scan_candidates(text: &[u8]) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < text.len() {
        let at_word_start = i == 0 || !is_word_byte(text[i - 1]);

        if at_word_start && text[i].is_ascii_digit() {
            if let Some((candidate, next)) = numeric_run(text, i, false) {
                out.push(candidate);
                i = next;
                continue;
            }
        }

        if text[i] == b'$' && text.get(i + 1).is_some_and(u8::is_ascii_digit) {
            if let Some((candidate, next)) = numeric_run(text, i + 1, true) {
                out.push(Candidate { start: i, ..candidate });
                i = next;
                continue;
            }
        }

        if at_word_start && text[i].is_ascii_alphanumeric() {
            let (candidate, next) = token_run(text, i);
            if let Some(c) = candidate {
                out.push(c);
            }
            i = next;
            continue;
        }

        i += 1;
    }

    out
}

/// Reads digit groups starting at `start`. Returns `None` if the run is
/// glued to a following letter (`12th`, `4x4`); the caller then reads it
/// as an alphanumeric token instead.
fn numeric_run(text: &[u8], start: usize, currency: bool) -> Option<(Candidate, usize)> {
    let mut groups = Vec::new();
    let mut separators = Vec::new();
    let mut i = start;

    loop {
        let group_start = i;
        while i < text.len() && text[i].is_ascii_digit() {
            i += 1;
        }
        groups.push(i - group_start);

        // A separator continues the run only if a digit follows it,
        // optionally after one space (", " in "July 3, 1979").
        let Some(&sep) = text.get(i) else { break };
        if !GROUP_SEPARATORS.contains(&sep) {
            break;
        }
        let mut next = i + 1;
        if sep != b' ' && text.get(next) == Some(&b' ') {
            next += 1;
        }
        if text.get(next).is_some_and(u8::is_ascii_digit) {
            separators.push(sep);
            i = next;
        } else {
            break;
        }
    }

    if text.get(i).is_some_and(|b| is_word_byte(*b)) {
        return None;
    }

    Some((
        Candidate {
            start,
            end: i,
            shape: Shape::Numeric { groups, separators, currency },
        },
        i,
    ))
}

/// Reads a token of word bytes, dashes, dots and `@`. Only tokens mixing
/// letters and digits become candidates.
fn token_run(text: &[u8], start: usize) -> (Option<Candidate>, usize) {
    let mut i = start;
    while i < text.len() && is_token_byte(text[i]) {
        i += 1;
    }
    let next = i;

    // Trailing punctuation belongs to the sentence, not the token.
    let mut end = i;
    while end > start && matches!(text[end - 1], b'.' | b'-' | b'_') {
        end -= 1;
    }
    let token = &text[start..end];

    let letters = token.iter().filter(|b| b.is_ascii_alphabetic()).count();
    let digits = token.iter().filter(|b| b.is_ascii_digit()).count();
    if letters == 0 || digits == 0 {
        return (None, next);
    }

    let candidate = Candidate {
        start,
        end,
        shape: Shape::AlphaNumeric {
            letters,
            digits,
            has_at: token.contains(&b'@'),
            has_dot: token.contains(&b'.'),
        },
    };
    (Some(candidate), next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn numeric(c: &Candidate) -> (Vec<usize>, Vec<u8>, bool) {
        match &c.shape {
            Shape::Numeric { groups, separators, currency } => {
                (groups.clone(), separators.clone(), *currency)
            }
            other => panic!("expected numeric shape, got {:?}", other),
        }
    }

    #[test]
    fn test_grouped_ssn_is_one_candidate() {
        let text = b"My SSN is 234-56-7890 today";
        let found = scan_candidates(text);
        assert_eq!(found.len(), 1);
        assert_eq!(&text[found[0].start..found[0].end], b"234-56-7890");
        assert_eq!(numeric(&found[0]), (vec![3, 2, 4], vec![b'-', b'-'], false));
    }

    #[test]
    fn test_currency_and_month_day_year() {
        let text = b"Income $112,800 since July 3, 1979.";
        let found = scan_candidates(text);
        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].start..found[0].end], b"$112,800");
        assert!(numeric(&found[0]).2);
        assert_eq!(&text[found[1].start..found[1].end], b"3, 1979");
        assert_eq!(numeric(&found[1]).0, vec![1, 4]);
    }

    #[test]
    fn test_separator_without_following_digit_ends_run() {
        let text = b"(Exp: 05/29, CVV: 1234)";
        let found = scan_candidates(text);
        let spans: Vec<&[u8]> = found.iter().map(|c| &text[c.start..c.end]).collect();
        assert_eq!(spans, vec![&b"05/29"[..], &b"1234"[..]]);
    }

    #[test]
    fn test_digits_glued_to_letters_are_not_numeric() {
        let text = b"the 12th item";
        let found = scan_candidates(text);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].shape,
            Shape::AlphaNumeric { letters: 2, digits: 2, has_at: false, has_dot: false }
        );
    }

    #[test]
    fn test_alphanumeric_tokens() {
        let text = b"License: CA-DL-C7394856. Mail amandagj1990@techmail.com";
        let found = scan_candidates(text);
        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].start..found[0].end], b"CA-DL-C7394856");
        assert!(matches!(found[1].shape, Shape::AlphaNumeric { has_at: true, .. }));
    }
}
