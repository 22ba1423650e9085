/// Preference prediction: Elo expectation blended with patterns learned from
/// past comparisons between categorically similar items.
use crate::constants::{MIN_HISTORY_FOR_PATTERNS, MIN_SIMILAR_COMPARISONS, SIMILAR_COMPARISON_THRESHOLD};
use crate::elo::calculate_expected_outcome;
use crate::similarity::category_similarity;
use crate::types::{ComparisonRecord, Item, Prediction};

/// Confidence reported when history is too short to look for patterns.
const ELO_ONLY_CONFIDENCE: f64 = 0.3;
/// Confidence reported when history exists but too little of it is similar.
const FEW_SIMILAR_CONFIDENCE: f64 = 0.4;
/// Similar comparisons at which the pattern layer reaches full weight.
const PATTERN_SATURATION: f64 = 20.0;
const MAX_PATTERN_CONFIDENCE: f64 = 0.8;
const MAX_CONFIDENCE: f64 = 0.9;

/// Predict the outcome of `item_a` vs `item_b` from ratings and history.
pub fn predict_preference(item_a: &Item, item_b: &Item, history: &[ComparisonRecord]) -> Prediction {
    predict_with_history(item_a, item_b, history.iter())
}

/// Same as `predict_preference` over any view of the history, so callers can
/// hold records out without copying.
pub(crate) fn predict_with_history<'h>(
    item_a: &Item,
    item_b: &Item,
    history: impl Iterator<Item = &'h ComparisonRecord> + Clone,
) -> Prediction {
    let elo_prediction = calculate_expected_outcome(item_a.rating, item_b.rating);

    if history.clone().count() < MIN_HISTORY_FOR_PATTERNS {
        return Prediction {
            expected_outcome_a: elo_prediction,
            confidence: ELO_ONLY_CONFIDENCE,
        };
    }

    let similarity = category_similarity(item_a, item_b);

    let similar: Vec<SimilarComparison<'h>> = history
        .filter_map(|record| SimilarComparison::from_record(record, item_a, item_b))
        .filter(|s| s.mean_similarity() > SIMILAR_COMPARISON_THRESHOLD)
        .collect();

    if similar.len() < MIN_SIMILAR_COMPARISONS {
        return Prediction {
            expected_outcome_a: elo_prediction,
            confidence: FEW_SIMILAR_CONFIDENCE,
        };
    }

    let mut pattern_score = 0.0;
    let mut pattern_weight = 0.0;

    for s in &similar {
        // Same direction: our A looks like their A and our B looks like their B.
        let same_direction = s.a_to_hist_a > s.a_to_hist_b && s.b_to_hist_b > s.b_to_hist_a;

        let historical_outcome = if s.winner.id == s.hist_a.id { 1.0 } else { 0.0 };
        let relevant_outcome = if same_direction { historical_outcome } else { 1.0 - historical_outcome };

        let weight = category_similarity(if same_direction { item_a } else { item_b }, s.winner);

        pattern_score += relevant_outcome * weight;
        pattern_weight += weight;
    }

    let pattern_prediction = if pattern_weight > 0.0 { pattern_score / pattern_weight } else { 0.5 };

    let pattern_confidence = (similar.len() as f64 / PATTERN_SATURATION).min(MAX_PATTERN_CONFIDENCE);
    let combined = elo_prediction * (1.0 - pattern_confidence) + pattern_prediction * pattern_confidence;
    let confidence = (0.3 + pattern_confidence * 0.5 + similarity * 0.2).min(MAX_CONFIDENCE);

    Prediction {
        expected_outcome_a: combined,
        confidence,
    }
}

/// A historical comparison together with its cross-similarities to the pair
/// being predicted.
struct SimilarComparison<'h> {
    hist_a: &'h Item,
    winner: &'h Item,
    a_to_hist_a: f64,
    a_to_hist_b: f64,
    b_to_hist_a: f64,
    b_to_hist_b: f64,
}

impl<'h> SimilarComparison<'h> {
    fn from_record(record: &'h ComparisonRecord, item_a: &Item, item_b: &Item) -> Option<Self> {
        let (hist_a, hist_b) = record.pair()?;
        let winner = record.winner.as_ref()?;
        Some(SimilarComparison {
            hist_a,
            winner,
            a_to_hist_a: category_similarity(item_a, hist_a),
            a_to_hist_b: category_similarity(item_a, hist_b),
            b_to_hist_a: category_similarity(item_b, hist_a),
            b_to_hist_b: category_similarity(item_b, hist_b),
        })
    }

    fn mean_similarity(&self) -> f64 {
        (self.a_to_hist_a + self.b_to_hist_b + self.a_to_hist_b + self.b_to_hist_a) / 4.0
    }
}
