/// Rating every item starts from (and returns to on reset).
pub const DEFAULT_RATING: f64 = 1200.0;

/// Default Elo step size. User-adjustable as "rating volatility".
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Logistic scale of the Elo curve: a 400 point gap means 10:1 odds.
pub const ELO_SCALE: f64 = 400.0;

/// Below this many comparisons the predictor does not look for patterns
/// and falls back to the plain Elo expectation.
pub const MIN_HISTORY_FOR_PATTERNS: usize = 5;

/// Minimum number of similar historical comparisons before the pattern
/// layer contributes to a prediction.
pub const MIN_SIMILAR_COMPARISONS: usize = 3;

/// Mean cross-similarity a historical comparison must exceed to count as
/// similar to the one being predicted.
pub const SIMILAR_COMPARISON_THRESHOLD: f64 = 0.3;

/// Pairs appearing in this many most recent comparisons are not offered again.
pub const RECENT_PAIR_WINDOW: usize = 10;

/// History length at which pair selection leaves the exploration phase.
pub const EXPLORATION_PHASE_LENGTH: usize = 10;

/// Number of recent comparisons inspected for transitivity violations.
pub const CONSISTENCY_WINDOW: usize = 20;

/// Number of most recent comparisons held out to measure predictive accuracy.
pub const ACCURACY_HOLDOUT: usize = 10;

/// Rating range treated as a fully spread-out ranking.
pub const MAX_EXPECTED_RATING_SPREAD: f64 = 800.0;
