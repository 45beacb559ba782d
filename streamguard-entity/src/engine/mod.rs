//! The core entity engine for StreamGuard.
//!
//! Implements a candidate-then-classify strategy: the scanner proposes
//! spans, each span is classified from its shape and preceding keyword,
//! and only matches over the confidence threshold survive.

extern crate alloc;
use alloc::vec::Vec;
use daachorse::errors::DaachorseError;

use crate::context::{ContextHit, ContextScanner};
use crate::entropy::normalized_entropy;
use crate::kind::EntityKind;
use crate::Confidence;
use crate::scanner::{scan_candidates, Candidate, Shape};
use crate::scoring::{calculate_confidence, ContextSignal, ScoringWeights};
use crate::validators::{is_valid_luhn, is_valid_ssn};

/// Bytes looked back from a candidate when searching for a keyword.
pub const DEFAULT_CONTEXT_WINDOW: usize = 48;

const STREET_SUFFIXES: &[&str] = &[
    "street", "st", "avenue", "ave", "boulevard", "blvd", "road", "rd",
    "drive", "dr", "lane", "ln", "way", "circle", "cir", "court", "ct",
    "place", "pl",
];

/// Words allowed between a house number and the street suffix.
const MAX_STREET_WORDS: usize = 4;

/// Represents a recognised entity in text.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMatch {
    pub start: usize,
    pub end: usize,
    pub kind: EntityKind,
    pub confidence: Confidence,
}

/// What the shape of a candidate suggests, before keyword context is applied.
#[derive(Debug, Clone, Copy)]
struct Classification {
    kind: EntityKind,
    shape_score: f64,
    start: usize,
    end: usize,
}

/// The main engine responsible for identifying entities by combining
/// shape analysis with contextual keyword matching.
#[derive(Debug)]
pub struct EntityEngine {
    context_scanner: ContextScanner,
    scoring_weights: ScoringWeights,
    confidence_threshold: Confidence,
    context_window: usize,
}

impl EntityEngine {
    /// Initializes a new engine reporting matches scored at or above `threshold`.
    pub fn new(threshold: Confidence) -> Result<Self, DaachorseError> {
        Ok(Self {
            context_scanner: ContextScanner::new()?,
            scoring_weights: ScoringWeights::default(),
            confidence_threshold: threshold,
            context_window: DEFAULT_CONTEXT_WINDOW,
        })
    }

    /// Overrides how far back keywords are searched.
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    pub fn confidence_threshold(&self) -> Confidence {
        self.confidence_threshold
    }

    /// Scans a byte slice and returns restricted entities ordered by start
    /// offset. Matches never overlap.
    pub fn scan(&self, text: &[u8]) -> Vec<EntityMatch> {
        let mut raw_matches = Vec::new();

        for candidate in scan_candidates(text) {
            let hit = self
                .context_scanner
                .nearest_preceding(text, candidate.start, self.context_window);

            let Some(class) = classify(&candidate, hit, text) else {
                continue;
            };
            if !class.kind.is_restricted() {
                continue;
            }

            let signal = match hit {
                None => ContextSignal::None,
                Some(h) if h.kind == class.kind => ContextSignal::Agrees,
                Some(_) => ContextSignal::Conflicts,
            };
            let confidence = calculate_confidence(class.shape_score, signal, &self.scoring_weights);

            if confidence >= self.confidence_threshold {
                raw_matches.push(EntityMatch {
                    start: class.start,
                    end: class.end,
                    kind: class.kind,
                    confidence,
                });
            }
        }

        consolidate_matches(raw_matches)
    }
}

/// Keeps the more confident of two overlapping matches.
fn consolidate_matches(mut matches: Vec<EntityMatch>) -> Vec<EntityMatch> {
    matches.sort_by_key(|m| m.start);

    let mut merged: Vec<EntityMatch> = Vec::with_capacity(matches.len());
    for next in matches {
        match merged.last_mut() {
            Some(current) if next.start < current.end => {
                if next.confidence > current.confidence {
                    *current = next;
                }
            }
            _ => merged.push(next),
        }
    }
    merged
}

fn classify(c: &Candidate, hit: Option<ContextHit>, text: &[u8]) -> Option<Classification> {
    let class = |kind, shape_score| Classification { kind, shape_score, start: c.start, end: c.end };

    // Contact details are left alone; "Phone: 555-123-4567" is not a bank number.
    if let Some(h) = hit {
        if !h.kind.is_restricted() {
            return None;
        }
    }

    match &c.shape {
        Shape::AlphaNumeric { has_at: true, .. } => None,
        Shape::AlphaNumeric { digits, has_dot, .. } => {
            let token = &text[c.start..c.end];
            if *has_dot || *digits < 5 || token.len() < 8 {
                return None;
            }
            // Only a licence/passport keyword should push an ID over the line.
            Some(class(EntityKind::Identifier, normalized_entropy(token) * 0.4))
        }
        Shape::Numeric { groups, separators, currency } => {
            classify_numeric(c, groups, separators, *currency, hit, text, &class)
        }
    }
}

fn classify_numeric(
    c: &Candidate,
    groups: &[usize],
    separators: &[u8],
    currency: bool,
    hit: Option<ContextHit>,
    text: &[u8],
    class: &dyn Fn(EntityKind, f64) -> Classification,
) -> Option<Classification> {
    let digits = c.digit_count();
    let all_sep = |s: u8| !separators.is_empty() && separators.iter().all(|b| *b == s);

    if currency {
        return Some(class(EntityKind::Amount, 0.9));
    }

    // Numeric dates: 07/03/1979 and 1979-07-03.
    let numeric_date = match groups {
        [g0, g1, g2] => {
            (all_sep(b'/') && (1..=2).contains(g0) && (1..=2).contains(g1) && *g2 == 4)
                || (all_sep(b'-') && *g0 == 4 && *g1 == 2 && *g2 == 2)
        }
        _ => false,
    };
    if numeric_date {
        return Some(class(EntityKind::DateTime, 0.8));
    }

    // "July 3, 1979" and "March 14": the date starts at the month name.
    if let Some(h) = hit.filter(|h| h.is_month) {
        let adjacent = text[h.end..c.start].iter().all(|b| *b == b' ');
        let day_year = match groups {
            [d] => (1..=2).contains(d),
            [d, y] => (1..=2).contains(d) && *y == 4 && all_sep(b','),
            _ => false,
        };
        if adjacent && day_year {
            return Some(Classification {
                kind: EntityKind::DateTime,
                shape_score: 0.8,
                start: h.start,
                end: c.end,
            });
        }
    }

    if let [2, 2] = groups {
        if all_sep(b'/') {
            return Some(class(EntityKind::CardExpiry, 0.3));
        }
    }

    if let [house] = groups {
        if *house <= 5 {
            if let Some(end) = street_extent(text, c.end) {
                return Some(Classification {
                    kind: EntityKind::Location,
                    shape_score: 0.8,
                    start: c.start,
                    end,
                });
            }
        }
    }

    if let [3] | [4] = groups {
        return Some(class(EntityKind::Cvv, 0.1));
    }

    let card_grouping = groups.len() == 1
        || groups.iter().all(|g| *g == 4)
        || groups == [4, 6, 5];
    if (13..=19).contains(&digits) && card_grouping {
        let score = if is_valid_luhn(&text[c.start..c.end]) { 0.9 } else { 0.6 };
        return Some(class(EntityKind::CreditCard, score));
    }

    if let [3, 2, 4] = groups {
        if all_sep(b'-') || all_sep(b' ') {
            let score = if is_valid_ssn(&text[c.start..c.end]) { 0.8 } else { 0.3 };
            return Some(class(EntityKind::UsSsn, score));
        }
    }
    if let [9] = groups {
        return Some(class(EntityKind::UsSsn, 0.3));
    }

    // Local and North American phone layouts.
    if let [3, 4] | [3, 3, 4] = groups {
        return None;
    }

    if let [n] = groups {
        if (10..=12).contains(n) {
            return Some(class(EntityKind::BankNumber, 0.4));
        }
    }

    let thousands = groups.len() > 1
        && (1..=3).contains(&groups[0])
        && groups[1..].iter().all(|g| *g == 3)
        && all_sep(b',');
    if thousands {
        return Some(class(EntityKind::Amount, 0.4));
    }

    // Anything else long enough takes the kind of the keyword in front of it.
    match hit {
        Some(h) if !h.is_month && digits >= 4 => Some(class(h.kind, 0.0)),
        _ => None,
    }
}

/// Returns the end of "Sunset Boulevard" in "1234 Sunset Boulevard" when
/// `from` sits right after a house number.
fn street_extent(text: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    for _ in 0..MAX_STREET_WORDS + 1 {
        let gap = i;
        while i < text.len() && matches!(text[i], b' ' | b'\t') {
            i += 1;
        }
        if i == gap || !text.get(i).is_some_and(u8::is_ascii_uppercase) {
            return None;
        }

        let word_start = i;
        while i < text.len() && text[i].is_ascii_alphabetic() {
            i += 1;
        }
        let word = &text[word_start..i];
        let is_suffix = STREET_SUFFIXES
            .iter()
            .any(|s| s.as_bytes().eq_ignore_ascii_case(word));
        if is_suffix {
            // "Blvd." keeps its abbreviation dot.
            if text.get(i) == Some(&b'.') && word.len() <= 4 {
                i += 1;
            }
            return Some(i);
        }
    }
    None
}
