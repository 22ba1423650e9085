/// tasteduel-core: Pure-computation preference ranking engine.
///
/// Head-to-head user choices → Elo ratings → next most informative pair, plus
/// a confidence score for the ranking. No IO, no UI, no global state: the
/// caller owns the catalog and history and passes them in.
///
/// Items are identified by caller-provided `i64` IDs.
///
/// # Quick start
///
/// ```rust
/// use tasteduel_core::{Item, NullReporter, RankingSession, SessionConfig};
///
/// let items = vec![Item::new(1, "Pizza"), Item::new(2, "Sushi"), Item::new(3, "Ramen")];
/// let mut session = RankingSession::new(items, Vec::new(), SessionConfig::default()).unwrap();
///
/// let mut rng = rand::rng();
/// let (a, b) = session.next_pair(&mut rng, &NullReporter).unwrap();
/// // ...show `a` and `b` to the user, who picks `a`...
/// session.record_choice(a.id, b.id, a.id, 0).unwrap();
///
/// for (rank, item) in session.rankings().iter().enumerate() {
///     println!("{}. {} ({})", rank + 1, item.name, item.rating);
/// }
/// println!("confidence: {:.2}", session.confidence());
/// ```

pub mod confidence;
pub mod constants;
pub mod elo;
pub mod engine;
pub mod pairing;
pub mod prediction;
pub mod report;
pub mod similarity;
pub mod types;

// Re-export primary public API at crate root.
pub use confidence::{calculate_confidence, confidence_breakdown, ConfidenceBreakdown};
pub use elo::{calculate_expected_outcome, calculate_min_comparisons, sort_items_by_rating, update_ratings};
pub use engine::{AppPhase, AppState, RankingSession, SessionConfig, SessionError};
pub use pairing::{adaptive_randomness, matches_category_filters, select_comparison_pair, PairFactors, SelectionPhase};
pub use prediction::predict_preference;
pub use report::{NullReporter, Reporter, Severity, TracingReporter};
pub use similarity::category_similarity;
pub use types::{
    Categories, CategoryType, CategoryValue, ComparisonRecord, Item, ItemId, Prediction, SelectionOptions,
    UnknownCategoryType,
};
