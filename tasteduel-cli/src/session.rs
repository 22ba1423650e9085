/// Loading and saving a ranking session through a `Store`.
///
/// Unreadable saved data is logged and treated as absent, so a damaged data
/// directory never blocks a new session.
use std::path::Path;

use tasteduel_core::{AppPhase, AppState, Item, ItemId, RankingSession, SessionConfig};

use crate::bail;
use crate::catalog;
use crate::store::{Store, APP_STATE_KEY, FOOD_ITEMS_KEY};

/// A catalog file wins and picks up saved ratings by id. Without one, the saved
/// items are used, falling back to the built-in foods.
pub fn load_items(store: &impl Store, catalog_path: Option<&Path>) -> Vec<Item> {
    let saved: Option<Vec<Item>> = store.load(FOOD_ITEMS_KEY).unwrap_or_else(|e| {
        tracing::warn!("Ignoring saved items: {e}");
        None
    });

    match (catalog_path, saved) {
        (Some(path), saved) => {
            let mut items = catalog::load_catalog(path);
            if let Some(saved) = saved {
                let merged = catalog::merge_ratings(&mut items, &saved);
                tracing::info!("Restored ratings for {merged} of {} items", items.len());
            }
            items
        }
        (None, Some(saved)) if saved.len() >= 2 => saved,
        (None, _) => catalog::default_catalog(),
    }
}

/// Saved app state, or a fresh one when it is missing, unreadable, or
/// mentions items that are not in `items`.
pub fn load_state(store: &impl Store, items: &[Item]) -> AppState {
    let state: AppState = store
        .load(APP_STATE_KEY)
        .unwrap_or_else(|e| {
            tracing::warn!("Ignoring saved state: {e}");
            None
        })
        .unwrap_or_default();

    // History about items that are no longer in the catalog would skew pairing.
    let known: Vec<ItemId> = items.iter().map(|i| i.id).collect();
    let stale = state
        .comparison_history
        .iter()
        .filter_map(|r| r.pair())
        .any(|(a, b)| !known.contains(&a.id) || !known.contains(&b.id));
    if stale {
        tracing::warn!("Saved history refers to items outside the current catalog, starting fresh");
        return AppState::default();
    }
    state
}

pub fn load_session(store: &impl Store, catalog_path: Option<&Path>, config: SessionConfig) -> RankingSession {
    let items = load_items(store, catalog_path);
    let state = load_state(store, &items);
    RankingSession::from_state(items, state, config).unwrap_or_else(|e| bail(format!("Invalid catalog: {e}")))
}

/// Persist items and state. Failures are logged; the session goes on in memory.
pub fn save_session(store: &impl Store, session: &RankingSession, phase: AppPhase) {
    if let Err(e) = store.save(FOOD_ITEMS_KEY, session.items()) {
        tracing::error!("Failed to save items: {e}");
    }
    if let Err(e) = store.save(APP_STATE_KEY, &session.to_state(phase)) {
        tracing::error!("Failed to save state: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use tasteduel_core::constants::DEFAULT_RATING;
    use tasteduel_core::ComparisonRecord;

    fn pair_of(a: &str, b: &str) -> Vec<Item> {
        vec![Item::new(1, a), Item::new(2, b)]
    }

    #[test]
    fn test_fresh_store_uses_default_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let items = load_items(&store, None);
        assert_eq!(items, catalog::default_catalog());
        assert_eq!(load_state(&store, &items), AppState::default());
    }

    #[test]
    fn test_saved_items_are_reused() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let saved = vec![Item::new(1, "Pho").with_rating(1240.0), Item::new(2, "Bagel").with_rating(1160.0)];
        store.save(FOOD_ITEMS_KEY, &saved).unwrap();
        assert_eq!(load_items(&store, None), saved);
    }

    #[test]
    fn test_unusable_saved_items_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save(FOOD_ITEMS_KEY, &vec![Item::new(1, "Lonely")]).unwrap();
        assert_eq!(load_items(&store, None).len(), 10);

        std::fs::write(dir.path().join(format!("{FOOD_ITEMS_KEY}.json")), "[{ broken").unwrap();
        assert_eq!(load_items(&store, None).len(), 10);
    }

    #[test]
    fn test_catalog_file_keeps_saved_ratings() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));
        store
            .save(FOOD_ITEMS_KEY, &vec![Item::new(2, "Bagel").with_rating(1290.0), Item::new(7, "Gone").with_rating(900.0)])
            .unwrap();

        let catalog_path = dir.path().join("foods.json");
        std::fs::write(&catalog_path, r#"[{ "id": 1, "name": "Pho" }, { "id": 2, "name": "Bagel" }, { "id": 3, "name": "Taco" }]"#)
            .unwrap();

        let items = load_items(&store, Some(&catalog_path));
        let ratings: Vec<(ItemId, f64)> = items.iter().map(|i| (i.id, i.rating)).collect();
        assert_eq!(ratings, vec![(1, DEFAULT_RATING), (2, 1290.0), (3, DEFAULT_RATING)]);
    }

    #[test]
    fn test_stale_history_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let old = pair_of("Pizza", "Sushi");
        let record = ComparisonRecord::new(old[0].clone(), Item::new(99, "Removed"), true, 1);
        let state = AppState {
            current_state: AppPhase::Comparison,
            comparison_history: vec![record],
            ..AppState::default()
        };
        store.save(APP_STATE_KEY, &state).unwrap();

        assert_eq!(load_state(&store, &old), AppState::default());
    }

    #[test]
    fn test_matching_history_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let items = pair_of("Pizza", "Sushi");
        let state = AppState {
            current_state: AppPhase::Comparison,
            comparison_history: vec![
                ComparisonRecord::new(items[0].clone(), items[1].clone(), false, 1),
                ComparisonRecord::default(),
            ],
            ..AppState::default()
        };
        store.save(APP_STATE_KEY, &state).unwrap();

        assert_eq!(load_state(&store, &items), state);
    }

    #[test]
    fn test_save_then_load_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let mut session = load_session(&store, None, SessionConfig::default());
        let (a, b) = (session.items()[0].id, session.items()[1].id);
        session.record_choice(a, b, b, 42).unwrap();
        save_session(&store, &session, AppPhase::Results);

        let resumed = load_session(&store, None, SessionConfig::default());
        assert_eq!(resumed.items(), session.items());
        assert_eq!(resumed.history(), session.history());
        let state: AppState = store.load(APP_STATE_KEY).unwrap().unwrap();
        assert_eq!(state.current_state, AppPhase::Results);
        assert_eq!(state.completed_comparisons, 1);
    }
}
