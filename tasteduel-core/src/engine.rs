/// Ranking session orchestrator.
///
/// Owns the catalog and the comparison history explicitly. The caller shows
/// the pair returned by `next_pair()` somewhere, then feeds the pick back via
/// `record_choice()`. Every query is recomputed from that state; nothing is cached.
use rand::Rng;

use crate::confidence::{calculate_confidence, confidence_breakdown, ConfidenceBreakdown};
use crate::constants::{DEFAULT_K_FACTOR, DEFAULT_RATING};
use crate::elo::{calculate_min_comparisons, sort_items_by_rating, update_ratings};
use crate::pairing::select_comparison_pair;
use crate::prediction::predict_preference;
use crate::report::Reporter;
use crate::types::{ComparisonRecord, IdMap, Item, ItemId, Prediction, SelectionOptions};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("duplicate item id {0}")]
    DuplicateItemId(ItemId),
    #[error("a ranking session needs at least two items, got {0}")]
    TooFewItems(usize),
    #[error("unknown item id {0}")]
    UnknownItem(ItemId),
    #[error("an item cannot be compared with itself (id {0})")]
    SelfComparison(ItemId),
    #[error("winner {winner} is not one of the compared items ({item_a}, {item_b})")]
    WinnerNotInPair { winner: ItemId, item_a: ItemId, item_b: ItemId },
}

/// Configuration for a ranking session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Elo step size ("rating volatility").
    pub k_factor: f64,
    pub selection: SelectionOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            k_factor: DEFAULT_K_FACTOR,
            selection: SelectionOptions::default(),
        }
    }
}

/// Which screen the surrounding application is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AppPhase {
    #[default]
    Landing,
    Comparison,
    Results,
}

/// Application state as persisted between runs.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AppState {
    pub current_state: AppPhase,
    /// Comparisons planned for a meaningful ranking.
    pub total_comparisons: usize,
    pub completed_comparisons: usize,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::types::lenient::history"))]
    pub comparison_history: Vec<ComparisonRecord>,
}

pub struct RankingSession {
    id_map: IdMap,
    items: Vec<Item>,
    history: Vec<ComparisonRecord>,
    config: SessionConfig,
}

impl RankingSession {
    pub fn new(items: Vec<Item>, history: Vec<ComparisonRecord>, config: SessionConfig) -> Result<Self, SessionError> {
        if items.len() < 2 {
            return Err(SessionError::TooFewItems(items.len()));
        }
        let id_map = IdMap::from_items(&items)?;

        Ok(RankingSession {
            id_map,
            items,
            history,
            config,
        })
    }

    /// Resume from persisted application state.
    pub fn from_state(items: Vec<Item>, state: AppState, config: SessionConfig) -> Result<Self, SessionError> {
        Self::new(items, state.comparison_history, config)
    }

    /// Snapshot for persistence. `phase` is whatever screen the caller is on.
    pub fn to_state(&self, phase: AppPhase) -> AppState {
        AppState {
            current_state: phase,
            total_comparisons: self.min_comparisons(),
            completed_comparisons: self.history.len(),
            comparison_history: self.history.clone(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn history(&self) -> &[ComparisonRecord] {
        &self.history
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.id_map.to_idx(id).map(|idx| &self.items[idx])
    }

    /// Next pair to show. `None` only if the catalog cannot produce a pair.
    pub fn next_pair(&self, rng: &mut impl Rng, reporter: &dyn Reporter) -> Option<(Item, Item)> {
        select_comparison_pair(&self.items, &self.history, &self.config.selection, rng, reporter)
            .map(|(a, b)| (a.clone(), b.clone()))
    }

    /// Record that the user picked `winner_id` out of `item_a_id` vs `item_b_id`.
    ///
    /// The record snapshots both items as they were shown, before the rating
    /// update. Returns the appended record.
    pub fn record_choice(
        &mut self,
        item_a_id: ItemId,
        item_b_id: ItemId,
        winner_id: ItemId,
        timestamp: u64,
    ) -> Result<&ComparisonRecord, SessionError> {
        if item_a_id == item_b_id {
            return Err(SessionError::SelfComparison(item_a_id));
        }
        if winner_id != item_a_id && winner_id != item_b_id {
            return Err(SessionError::WinnerNotInPair {
                winner: winner_id,
                item_a: item_a_id,
                item_b: item_b_id,
            });
        }
        let idx_a = self.id_map.to_idx(item_a_id).ok_or(SessionError::UnknownItem(item_a_id))?;
        let idx_b = self.id_map.to_idx(item_b_id).ok_or(SessionError::UnknownItem(item_b_id))?;

        let a_won = winner_id == item_a_id;
        let record = ComparisonRecord::new(self.items[idx_a].clone(), self.items[idx_b].clone(), a_won, timestamp);

        let (new_a, new_b) = update_ratings(
            self.items[idx_a].rating,
            self.items[idx_b].rating,
            if a_won { 1.0 } else { 0.0 },
            self.config.k_factor,
        );
        self.items[idx_a].rating = new_a;
        self.items[idx_b].rating = new_b;

        self.history.push(record);
        Ok(&self.history[self.history.len() - 1])
    }

    /// Prediction for two catalog items; uninformed if either id is unknown.
    pub fn predict(&self, item_a_id: ItemId, item_b_id: ItemId) -> Prediction {
        match (self.item(item_a_id), self.item(item_b_id)) {
            (Some(a), Some(b)) => predict_preference(a, b, &self.history),
            _ => Prediction::uninformed(),
        }
    }

    pub fn confidence(&self) -> f64 {
        calculate_confidence(&self.items, &self.history)
    }

    pub fn confidence_breakdown(&self) -> Option<ConfidenceBreakdown> {
        confidence_breakdown(&self.items, &self.history)
    }

    /// Items from best to worst.
    pub fn rankings(&self) -> Vec<Item> {
        sort_items_by_rating(&self.items)
    }

    pub fn completed_comparison_count(&self) -> usize {
        self.history.len()
    }

    pub fn min_comparisons(&self) -> usize {
        calculate_min_comparisons(self.items.len())
    }

    /// How often each item has been shown, in catalog order.
    pub fn games_played(&self) -> Vec<usize> {
        self.items
            .iter()
            .map(|item| {
                self.history
                    .iter()
                    .filter_map(ComparisonRecord::pair)
                    .filter(|(a, b)| a.id == item.id || b.id == item.id)
                    .count()
            })
            .collect()
    }

    /// Back to square one: default ratings, no history.
    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.rating = DEFAULT_RATING;
        }
        self.history.clear();
    }

    pub fn into_parts(self) -> (Vec<Item>, Vec<ComparisonRecord>) {
        (self.items, self.history)
    }
}
