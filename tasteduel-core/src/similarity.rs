/// Category similarity between two items.
///
/// NOTE: the score is directional. Matches count the values of `item_a` found
/// in `item_b`, while the denominator is the union of both value sets, so
/// `category_similarity(a, b)` and `category_similarity(b, a)` can differ when
/// one side repeats values. Callers that need both directions ask for both.
use std::collections::HashSet;

use crate::types::{CategoryType, Item};

/// Overlap of categorical metadata, in [0, 1].
///
/// Returns 0 if either item has no categories, or if no category type is
/// present on both items.
pub fn category_similarity(item_a: &Item, item_b: &Item) -> f64 {
    let (Some(cats_a), Some(cats_b)) = (&item_a.categories, &item_b.categories) else {
        return 0.0;
    };

    let mut match_count = 0usize;
    let mut union_size = 0usize;

    for category_type in CategoryType::ALL {
        let (Some(values_a), Some(values_b)) = (cats_a.get(category_type), cats_b.get(category_type)) else {
            continue;
        };

        match_count += values_a.iter().filter(|v| values_b.contains(*v)).count();

        let union: HashSet<&String> = values_a.iter().chain(values_b.iter()).collect();
        union_size += union.len();
    }

    if union_size > 0 {
        match_count as f64 / union_size as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Categories, CategoryValue};

    fn pizza() -> Item {
        Item::new(1, "Pizza").with_categories(
            Categories::default()
                .with(CategoryType::Cuisine, "Italian")
                .with(CategoryType::DishType, "Main")
                .with(CategoryType::Dietary, "Vegetarian")
                .with(CategoryType::Ingredient, vec!["Cheese", "Tomato", "Wheat"])
                .with(CategoryType::CookingMethod, "Baked"),
        )
    }

    fn pasta() -> Item {
        Item::new(4, "Pasta").with_categories(
            Categories::default()
                .with(CategoryType::Cuisine, "Italian")
                .with(CategoryType::DishType, "Main")
                .with(CategoryType::Ingredient, vec!["Wheat", "Tomato"])
                .with(CategoryType::CookingMethod, "Boiled"),
        )
    }

    #[test]
    fn test_self_similarity_is_one() {
        let p = pizza();
        assert!((category_similarity(&p, &p) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_categories_is_zero() {
        let bare = Item::new(9, "Mystery");
        assert_eq!(category_similarity(&bare, &pizza()), 0.0);
        assert_eq!(category_similarity(&pizza(), &bare), 0.0);
        assert_eq!(category_similarity(&bare, &bare), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // cuisine 1/1, type 1/1, dietary skipped, ingredient 2/3, method 0/2
        let s = category_similarity(&pizza(), &pasta());
        assert!((s - 4.0 / 7.0).abs() < 1e-12, "got {s}");
    }

    #[test]
    fn test_no_shared_category_types_is_zero() {
        let a = Item::new(1, "a").with_categories(Categories::default().with(CategoryType::Cuisine, "Thai"));
        let b = Item::new(2, "b").with_categories(Categories::default().with(CategoryType::Dietary, "Vegan"));
        assert_eq!(category_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_direction_matters_with_repeated_values() {
        let mut cats = Categories::default();
        cats.set(
            CategoryType::Ingredient,
            CategoryValue::Many(vec!["Rice".into(), "Rice".into(), "Fish".into()]),
        );
        let a = Item::new(1, "a").with_categories(cats);
        let b = Item::new(2, "b").with_categories(Categories::default().with(CategoryType::Ingredient, "Rice"));
        // a->b: both "Rice" entries match (2) over union {Rice, Fish} (2)
        assert!((category_similarity(&a, &b) - 1.0).abs() < 1e-12);
        // b->a: one match over the same union
        assert!((category_similarity(&b, &a) - 0.5).abs() < 1e-12);
    }
}
