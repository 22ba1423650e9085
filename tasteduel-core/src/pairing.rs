/// Adaptive pair selection.
///
/// Every unordered pair that was not shown recently is scored on four factors
/// (rating proximity, under-coverage, prediction uncertainty, category
/// interest), weighted by the phase of the session. The best pair usually
/// wins; early on the runners-up get a fair chance too.
use std::collections::{BTreeMap, HashMap};

use rand::seq::index::sample;
use rand::Rng;

use crate::constants::{EXPLORATION_PHASE_LENGTH, RECENT_PAIR_WINDOW};
use crate::prediction::predict_preference;
use crate::report::Reporter;
use crate::similarity::category_similarity;
use crate::types::{CategoryType, ComparisonRecord, Item, ItemId, SelectionOptions};

/// Weighting regime for pair scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Few comparisons so far: spread them across items and categories.
    Exploration,
    /// Enough history, user asked to prioritize close ratings.
    Refinement,
    /// Enough history, keep probing where the model is unsure.
    ContinuedExploration,
}

impl SelectionPhase {
    pub fn for_history(history_len: usize, prioritize_close_ratings: bool) -> Self {
        if history_len < EXPLORATION_PHASE_LENGTH {
            SelectionPhase::Exploration
        } else if prioritize_close_ratings {
            SelectionPhase::Refinement
        } else {
            SelectionPhase::ContinuedExploration
        }
    }
}

/// The four raw factors behind a pair's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairFactors {
    pub rating_proximity: f64,
    pub coverage: f64,
    pub uncertainty: f64,
    pub category_interest: f64,
}

impl PairFactors {
    /// `comparison_counts` holds how often each item appears in `history`.
    pub fn calculate(
        item_a: &Item,
        item_b: &Item,
        history: &[ComparisonRecord],
        comparison_counts: &HashMap<ItemId, usize>,
    ) -> Self {
        let rating_diff = (item_a.rating - item_b.rating).abs();
        let rating_proximity = 1000.0 / (rating_diff + 10.0);

        let count_a = comparison_counts.get(&item_a.id).copied().unwrap_or(0);
        let count_b = comparison_counts.get(&item_b.id).copied().unwrap_or(0);
        let coverage = 100.0 / (count_a.max(count_b) as f64 + 1.0);

        let prediction = predict_preference(item_a, item_b, history);
        let uncertainty = (1.0 - (prediction.expected_outcome_a - 0.5).abs() * 2.0) * (1.0 - prediction.confidence) * 100.0;

        // Partial overlap is the most informative; identical or disjoint items are not.
        let similarity = category_similarity(item_a, item_b);
        let category_interest = if similarity > 0.0 {
            (1.0 - (similarity - 0.5).abs() * 2.0) * 100.0
        } else {
            0.0
        };

        PairFactors {
            rating_proximity,
            coverage,
            uncertainty,
            category_interest,
        }
    }

    pub fn score(&self, phase: SelectionPhase) -> f64 {
        match phase {
            SelectionPhase::Exploration => {
                self.coverage * 0.5 + self.category_interest * 0.3 + self.rating_proximity * 0.2
            }
            SelectionPhase::Refinement => {
                self.rating_proximity * 0.4 + self.uncertainty * 0.3 + self.coverage * 0.2 + self.category_interest * 0.1
            }
            SelectionPhase::ContinuedExploration => {
                self.uncertainty * 0.4 + self.coverage * 0.3 + self.category_interest * 0.2 + self.rating_proximity * 0.1
            }
        }
    }
}

/// Probability mass left to the runners-up: shrinks from 0.9 to 0.1 as
/// history grows to 40 comparisons.
pub fn adaptive_randomness(history_len: usize) -> f64 {
    (0.9 - history_len as f64 / 50.0).max(0.1)
}

// ---------------------------------------------------------------------------
// Public selection entry point
// ---------------------------------------------------------------------------

/// Choose the next two items to compare.
///
/// Returns `None` when fewer than two items are given. Category filters that
/// leave fewer than two items are dropped, with a warning, in favor of the
/// full catalog.
pub fn select_comparison_pair<'a>(
    items: &'a [Item],
    history: &[ComparisonRecord],
    options: &SelectionOptions,
    rng: &mut impl Rng,
    reporter: &dyn Reporter,
) -> Option<(&'a Item, &'a Item)> {
    if items.len() < 2 {
        reporter.error("Need at least 2 items to compare");
        return None;
    }

    let pool = apply_category_filters(items, &options.selected_categories, reporter);

    if history.is_empty() {
        reporter.debug("No comparison history, selecting random pair");
        return Some(random_pair(&pool, rng));
    }

    let mut sorted_pool = pool.clone();
    sorted_pool.sort_by(|a, b| a.rating.partial_cmp(&b.rating).unwrap_or(std::cmp::Ordering::Equal));

    let comparison_counts = count_appearances(history);
    let recent = &history[history.len() - history.len().min(RECENT_PAIR_WINDOW)..];
    let phase = SelectionPhase::for_history(history.len(), options.prioritize_close_ratings);

    let mut candidates: Vec<(&'a Item, &'a Item, f64)> = Vec::new();
    for (i, &item_a) in sorted_pool.iter().enumerate() {
        for &item_b in &sorted_pool[i + 1..] {
            if recent.iter().any(|r| r.involves_pair(item_a.id, item_b.id)) {
                continue;
            }
            let factors = PairFactors::calculate(item_a, item_b, history, &comparison_counts);
            candidates.push((item_a, item_b, factors.score(phase)));
        }
    }

    if candidates.is_empty() {
        reporter.debug("No potential pairs found, selecting random pair");
        return Some(random_pair(&pool, rng));
    }

    candidates.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    let r = rng.random::<f64>();
    let rank = ranked_choice(candidates.len(), r, adaptive_randomness(history.len()));
    let (item_a, item_b, score) = candidates[rank];
    reporter.debug(&format!(
        "Selected pair #{} of {} ({} vs {}, score {:.2}, phase {:?})",
        rank + 1,
        candidates.len(),
        item_a.name,
        item_b.name,
        score,
        phase,
    ));
    Some((item_a, item_b))
}

/// Whether `item` satisfies every active filter type. Items without any
/// categories never match an active filter; an item that lacks one filtered
/// type is not excluded by that type.
pub fn matches_category_filters(item: &Item, selected: &BTreeMap<CategoryType, Vec<String>>) -> bool {
    let mut active = selected.iter().filter(|(_, accepted)| !accepted.is_empty()).peekable();
    if active.peek().is_none() {
        return true;
    }
    let Some(categories) = &item.categories else {
        return false;
    };
    active.all(|(&category_type, accepted)| match categories.get(category_type) {
        Some(values) => values.iter().any(|v| accepted.contains(v)),
        None => true,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn apply_category_filters<'a>(
    items: &'a [Item],
    selected: &BTreeMap<CategoryType, Vec<String>>,
    reporter: &dyn Reporter,
) -> Vec<&'a Item> {
    let filtered: Vec<&'a Item> = items.iter().filter(|item| matches_category_filters(item, selected)).collect();
    if filtered.len() < 2 {
        reporter.warning("Filtering resulted in too few items, using all items");
        return items.iter().collect();
    }
    filtered
}

fn count_appearances(history: &[ComparisonRecord]) -> HashMap<ItemId, usize> {
    let mut counts = HashMap::new();
    for record in history {
        for item in [&record.item_a, &record.item_b].into_iter().flatten() {
            *counts.entry(item.id).or_insert(0) += 1;
        }
    }
    counts
}

/// Two distinct items drawn uniformly without replacement. `pool` has at least two.
fn random_pair<'a>(pool: &[&'a Item], rng: &mut impl Rng) -> (&'a Item, &'a Item) {
    let picked = sample(rng, pool.len(), 2);
    (pool[picked.index(0)], pool[picked.index(1)])
}

/// Index of the candidate to take, given one uniform draw `r` in [0, 1).
fn ranked_choice(num_candidates: usize, r: f64, randomness: f64) -> usize {
    if r < 1.0 - randomness || num_candidates == 1 {
        0
    } else if r < 1.0 - randomness / 2.0 {
        1
    } else if num_candidates >= 3 {
        2
    } else {
        0
    }
}
