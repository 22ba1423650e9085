/// Ranking confidence: how far the current ratings can be trusted.
///
/// Combines pair coverage, rating spread, transitivity of recent choices,
/// held-out predictive accuracy and category coverage. Weights shift toward
/// the learned terms as history grows.
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::constants::{ACCURACY_HOLDOUT, CONSISTENCY_WINDOW, MAX_EXPECTED_RATING_SPREAD};
use crate::prediction::predict_with_history;
use crate::types::{CategoryType, ComparisonRecord, Item, ItemId};

/// Consistency is only measured once history is longer than this.
const MIN_HISTORY_FOR_CONSISTENCY: usize = 5;
/// Predictive accuracy is only measured once history is longer than this.
const MIN_HISTORY_FOR_ACCURACY: usize = 10;

/// The individual confidence factors, each in [0, 1] (category coverage can
/// exceed 1 when history mentions values no longer in the catalog).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBreakdown {
    pub history_len: usize,
    /// Distinct pairs compared / all possible pairs.
    pub coverage: f64,
    /// Rating range relative to a fully spread ranking.
    pub rating_spread: f64,
    /// 1 - share of 3-cycles among recent winner→loser→x paths.
    pub consistency: f64,
    /// Share of the last comparisons the model predicts with that comparison held out.
    pub predictive_accuracy: f64,
    /// Share of catalog category values that appeared in some comparison.
    pub category_coverage: f64,
}

impl ConfidenceBreakdown {
    /// History-size-independent blend of coverage, consistency and spread.
    pub fn basic_score(&self) -> f64 {
        (self.coverage * 0.5 + self.consistency * 0.3 + self.rating_spread * 0.2).clamp(0.0, 1.0)
    }

    /// Phased blend: coverage dominates early, learned terms weigh in later.
    pub fn score(&self) -> f64 {
        let score = if self.history_len < 10 {
            self.coverage * 0.6 + self.consistency * 0.3 + self.rating_spread * 0.1
        } else if self.history_len < 30 {
            self.coverage * 0.4
                + self.consistency * 0.2
                + self.rating_spread * 0.2
                + self.predictive_accuracy * 0.1
                + self.category_coverage * 0.1
        } else {
            self.coverage * 0.3
                + self.consistency * 0.2
                + self.rating_spread * 0.1
                + self.predictive_accuracy * 0.2
                + self.category_coverage * 0.2
        };
        score.clamp(0.0, 1.0)
    }
}

/// Overall ranking confidence in [0, 1]. Exactly 0 for fewer than two items
/// or an empty history.
pub fn calculate_confidence(items: &[Item], history: &[ComparisonRecord]) -> f64 {
    confidence_breakdown(items, history).map_or(0.0, |b| b.score())
}

/// All factors behind `calculate_confidence`, or `None` when there is nothing
/// to be confident about yet.
pub fn confidence_breakdown(items: &[Item], history: &[ComparisonRecord]) -> Option<ConfidenceBreakdown> {
    if items.len() < 2 || history.is_empty() {
        return None;
    }

    Some(ConfidenceBreakdown {
        history_len: history.len(),
        coverage: pair_coverage(items.len(), history),
        rating_spread: rating_spread(items),
        consistency: consistency(history),
        predictive_accuracy: predictive_accuracy(history),
        category_coverage: category_coverage(items, history),
    })
}

fn pair_coverage(num_items: usize, history: &[ComparisonRecord]) -> f64 {
    let total_pairs = (num_items * (num_items - 1)) as f64 / 2.0;
    let compared: HashSet<(ItemId, ItemId)> = history
        .iter()
        .filter_map(ComparisonRecord::pair)
        .map(|(a, b)| (a.id.min(b.id), a.id.max(b.id)))
        .collect();
    compared.len() as f64 / total_pairs
}

fn rating_spread(items: &[Item]) -> f64 {
    let (min, max) = items
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), item| (lo.min(item.rating), hi.max(item.rating)));
    ((max - min) / MAX_EXPECTED_RATING_SPREAD).min(1.0)
}

/// Looks for A→B→C→A cycles in the recent "beats" graph.
fn consistency(history: &[ComparisonRecord]) -> f64 {
    if history.len() <= MIN_HISTORY_FOR_CONSISTENCY {
        return 1.0;
    }

    let recent = &history[history.len() - history.len().min(CONSISTENCY_WINDOW)..];
    let mut beats: HashMap<ItemId, HashSet<ItemId>> = HashMap::new();
    for record in recent {
        let (Some(winner), Some(loser)) = (&record.winner, &record.loser) else {
            continue;
        };
        beats.entry(winner.id).or_default().insert(loser.id);
    }

    let mut violations = 0usize;
    let mut checks = 0usize;
    for (winner, losers) in &beats {
        for loser in losers {
            let Some(second_level) = beats.get(loser) else {
                continue;
            };
            for third in second_level {
                checks += 1;
                if beats.get(third).is_some_and(|s| s.contains(winner)) {
                    violations += 1;
                }
            }
        }
    }

    if checks > 0 {
        1.0 - violations as f64 / checks as f64
    } else {
        1.0
    }
}

/// Leave-one-out accuracy over the most recent comparisons.
fn predictive_accuracy(history: &[ComparisonRecord]) -> f64 {
    if history.len() <= MIN_HISTORY_FOR_ACCURACY {
        return 0.0;
    }

    let start = history.len() - ACCURACY_HOLDOUT;
    let mut correct = 0usize;
    for held_out in start..history.len() {
        let record = &history[held_out];
        let (Some((item_a, item_b)), Some(actual)) = (record.pair(), record.outcome_a()) else {
            continue;
        };
        let rest = history.iter().enumerate().filter(move |(i, _)| *i != held_out).map(|(_, r)| r);
        let prediction = predict_with_history(item_a, item_b, rest);
        let predicted = if prediction.expected_outcome_a >= 0.5 { 1.0 } else { 0.0 };
        if predicted == actual {
            correct += 1;
        }
    }
    correct as f64 / ACCURACY_HOLDOUT as f64
}

/// Distinct category values seen in history over distinct values in the catalog.
fn category_coverage(items: &[Item], history: &[ComparisonRecord]) -> f64 {
    if !items.iter().any(|item| item.categories.is_some()) {
        return 0.0;
    }

    let catalog_values = distinct_category_values(items.iter());
    let compared_values = distinct_category_values(
        history
            .iter()
            .filter_map(ComparisonRecord::pair)
            .flat_map(|(a, b)| [a, b]),
    );

    if catalog_values.is_empty() {
        0.0
    } else {
        compared_values.len() as f64 / catalog_values.len() as f64
    }
}

fn distinct_category_values<'i>(items: impl Iterator<Item = &'i Item>) -> BTreeSet<(CategoryType, &'i str)> {
    let mut values = BTreeSet::new();
    for item in items {
        let Some(categories) = &item.categories else {
            continue;
        };
        for category_type in CategoryType::ALL {
            for value in categories.get(category_type).unwrap_or_default() {
                values.insert((category_type, value.as_str()));
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Categories;

    fn item(id: i64, rating: f64) -> Item {
        Item::new(id, format!("item-{id}")).with_rating(rating)
    }

    fn beat(w: &Item, l: &Item) -> ComparisonRecord {
        ComparisonRecord::new(w.clone(), l.clone(), true, 0)
    }

    #[test]
    fn test_empty_history_is_zero() {
        let items = vec![item(1, 1200.0), item(2, 1300.0)];
        assert_eq!(calculate_confidence(&items, &[]), 0.0);
        assert!(confidence_breakdown(&items, &[]).is_none());
    }

    #[test]
    fn test_single_item_is_zero() {
        let items = vec![item(1, 1200.0)];
        let history = vec![ComparisonRecord::default()];
        assert_eq!(calculate_confidence(&items, &history), 0.0);
    }

    #[test]
    fn test_coverage_counts_unordered_pairs_once() {
        let items = vec![item(1, 1200.0), item(2, 1200.0), item(3, 1200.0)];
        let history = vec![beat(&items[0], &items[1]), beat(&items[1], &items[0]), ComparisonRecord::default()];
        let b = confidence_breakdown(&items, &history).unwrap();
        assert!((b.coverage - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(b.rating_spread, 0.0);
        // Too short to measure consistency or accuracy
        assert_eq!(b.consistency, 1.0);
        assert_eq!(b.predictive_accuracy, 0.0);
        assert_eq!(b.category_coverage, 0.0);
        assert!((b.score() - (0.6 / 3.0 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_rating_spread_caps_at_one() {
        let items = vec![item(1, 1000.0), item(2, 1400.0)];
        assert!((rating_spread(&items) - 0.5).abs() < 1e-12);
        let wide = vec![item(1, 500.0), item(2, 1900.0)];
        assert_eq!(rating_spread(&wide), 1.0);
    }

    #[test]
    fn test_transitive_history_is_consistent() {
        let items: Vec<Item> = (1..=4).map(|i| item(i, 1200.0)).collect();
        let history = vec![
            beat(&items[0], &items[1]),
            beat(&items[1], &items[2]),
            beat(&items[2], &items[3]),
            beat(&items[0], &items[2]),
            beat(&items[1], &items[3]),
            beat(&items[0], &items[3]),
        ];
        assert_eq!(consistency(&history), 1.0);
    }

    #[test]
    fn test_cycles_reduce_consistency() {
        let items: Vec<Item> = (1..=3).map(|i| item(i, 1200.0)).collect();
        // 1>2, 2>3, 3>1 repeated: every path closes a cycle
        let history: Vec<ComparisonRecord> = (0..2)
            .flat_map(|_| [beat(&items[0], &items[1]), beat(&items[1], &items[2]), beat(&items[2], &items[0])])
            .collect();
        assert_eq!(consistency(&history), 0.0);

        let b = confidence_breakdown(&items, &history).unwrap();
        let score = b.score();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_accuracy_on_a_consistent_favorite() {
        let champ = item(1, 1400.0);
        let others: Vec<Item> = (2..=6).map(|i| item(i, 1100.0)).collect();
        let history: Vec<ComparisonRecord> = (0..15).map(|i| beat(&champ, &others[i % others.len()])).collect();
        // Elo favors the higher-rated winner in every held-out record.
        assert_eq!(predictive_accuracy(&history), 1.0);
    }

    #[test]
    fn test_accuracy_counts_malformed_against_total() {
        let champ = item(1, 1400.0);
        let other = item(2, 1100.0);
        let mut history: Vec<ComparisonRecord> = (0..11).map(|_| beat(&champ, &other)).collect();
        history.extend((0..5).map(|_| ComparisonRecord::default()));
        assert!((predictive_accuracy(&history) - 0.5).abs() < 1e-12);
    }

    /// Each held-out record sits right at the pattern layer's tipping point, so
    /// predicting it with itself still in the history would flip the answer.
    #[test]
    fn test_accuracy_holds_each_record_out() {
        let food = |id: i64, cuisine: &str, kind: &str| {
            item(id, 1200.0).with_categories(
                Categories::default().with(CategoryType::Cuisine, cuisine).with(CategoryType::DishType, kind),
            )
        };
        let it = food(1, "Italian", "Main");
        let jp = food(2, "Japanese", "Main");
        let th = food(3, "Thai", "Dessert");
        let mx = food(4, "Mexican", "Dessert");
        let it_wins = || ComparisonRecord::new(it.clone(), jp.clone(), true, 0);
        let jp_wins = || ComparisonRecord::new(it.clone(), jp.clone(), false, 0);
        let th_wins = || ComparisonRecord::new(th.clone(), mx.clone(), true, 0);

        let mut history: Vec<ComparisonRecord> = (0..4).map(|_| jp_wins()).collect();
        history.extend([it_wins(), jp_wins(), th_wins(), it_wins(), jp_wins()]);
        history.extend([th_wins(), it_wins(), jp_wins(), th_wins(), jp_wins()]);
        assert_eq!(history.len(), 14);

        // Held-out Italian win: 2 Italian vs 8 Japanese wins remain, pattern favors B. Wrong.
        // Held-out Japanese win: 3 vs 7 remain, pattern favors A. Wrong.
        // Held-out Thai win: only 2 similar records remain, plain Elo ties to A. Right.
        assert!((predictive_accuracy(&history) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_cycles_outside_window_are_ignored() {
        let items: Vec<Item> = (1..=3).map(|i| item(i, 1200.0)).collect();
        let mut history = vec![beat(&items[0], &items[1]), beat(&items[1], &items[2]), beat(&items[2], &items[0])];
        history.extend((0..CONSISTENCY_WINDOW).map(|_| beat(&items[0], &items[1])));
        assert_eq!(consistency(&history), 1.0);

        // One more cycle edge inside the window is caught again.
        history.push(beat(&items[1], &items[2]));
        history.push(beat(&items[2], &items[0]));
        assert_eq!(consistency(&history), 0.0);
    }

    #[test]
    fn test_category_coverage() {
        let cats = |c: &str, d: &str| {
            Categories::default().with(CategoryType::Cuisine, c).with(CategoryType::Dietary, d)
        };
        let items = vec![
            item(1, 1200.0).with_categories(cats("Italian", "Vegetarian")),
            item(2, 1200.0).with_categories(cats("Japanese", "Pescatarian")),
            item(3, 1200.0).with_categories(cats("Mexican", "Vegetarian")),
        ];
        let history = vec![beat(&items[0], &items[1])];
        // catalog: 3 cuisines + 2 diets = 5; compared: Italian, Japanese, Vegetarian, Pescatarian
        assert!((category_coverage(&items, &history) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_phase_weights() {
        let b = ConfidenceBreakdown {
            history_len: 12,
            coverage: 0.5,
            rating_spread: 0.25,
            consistency: 1.0,
            predictive_accuracy: 0.8,
            category_coverage: 1.0,
        };
        assert!((b.score() - (0.2 + 0.2 + 0.05 + 0.08 + 0.1)).abs() < 1e-12);
        let late = ConfidenceBreakdown { history_len: 30, ..b };
        assert!((late.score() - (0.15 + 0.2 + 0.025 + 0.16 + 0.2)).abs() < 1e-12);
        assert!((b.basic_score() - (0.25 + 0.3 + 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_score_clamped() {
        let b = ConfidenceBreakdown {
            history_len: 40,
            coverage: 1.0,
            rating_spread: 1.0,
            consistency: 1.0,
            predictive_accuracy: 1.0,
            category_coverage: 3.0,
        };
        assert_eq!(b.score(), 1.0);
    }
}
