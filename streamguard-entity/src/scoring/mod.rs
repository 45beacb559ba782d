// streamguard-entity/src/scoring/mod.rs

/// How the nearest preceding keyword relates to the classified entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSignal {
    /// No keyword in the lookback window.
    None,
    /// The keyword names the same kind of entity.
    Agrees,
    /// The keyword names a different kind of entity.
    Conflicts,
}

/// Weights for the confidence calculation.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub shape_weight: f64,
    pub keyword_match_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            shape_weight: 1.0,
            keyword_match_weight: 1.0,
        }
    }
}

/// Calculates a confidence score (0.0 - 2.0) for a classified candidate.
///
/// `shape_score` is how strongly the candidate's shape alone suggests the
/// entity (0.0 - 1.0). A conflicting keyword adds nothing.
pub fn calculate_confidence(
    shape_score: f64,
    context: ContextSignal,
    weights: &ScoringWeights,
) -> f64 {
    let shape_contribution = shape_score.clamp(0.0, 1.0) * weights.shape_weight;

    let context_contribution = match context {
        ContextSignal::Agrees => weights.keyword_match_weight,
        ContextSignal::None | ContextSignal::Conflicts => 0.0,
    };

    shape_contribution + context_contribution
}
