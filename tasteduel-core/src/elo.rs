/// Elo rating model: expected outcome and rating updates.
///
/// Pure functions. Callers persist the returned ratings themselves.
use crate::constants::ELO_SCALE;
use crate::types::Item;

/// Probability that an item rated `rating_a` beats one rated `rating_b`.
pub fn calculate_expected_outcome(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / ELO_SCALE))
}

/// Apply one comparison result. `actual_outcome_a` is 1.0 if A won, 0.0 if B won.
///
/// Each side is rounded to the nearest integer independently, so the pair can
/// drift by one point from zero-sum.
pub fn update_ratings(rating_a: f64, rating_b: f64, actual_outcome_a: f64, k_factor: f64) -> (f64, f64) {
    let expected_a = calculate_expected_outcome(rating_a, rating_b);
    let expected_b = 1.0 - expected_a;
    let actual_b = 1.0 - actual_outcome_a;

    let new_a = round_half_up(rating_a + k_factor * (actual_outcome_a - expected_a));
    let new_b = round_half_up(rating_b + k_factor * (actual_b - expected_b));
    (new_a, new_b)
}

/// Round half toward positive infinity, so 1215.5 -> 1216 and -0.5 -> 0.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Items ordered from highest to lowest rating. Ties keep their input order.
pub fn sort_items_by_rating(items: &[Item]) -> Vec<Item> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Rough number of comparisons needed before a ranking of `item_count`
/// items is meaningful: `ceil(n * log2(n))`.
pub fn calculate_min_comparisons(item_count: usize) -> usize {
    if item_count < 2 {
        return 1;
    }
    let n = item_count as f64;
    (n.log2() * n).ceil() as usize
}
