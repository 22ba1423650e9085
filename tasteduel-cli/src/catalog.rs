/// Item catalog: the built-in foods, or a JSON file of items.
use std::collections::HashMap;
use std::path::Path;

use tasteduel_core::{Categories, CategoryType, Item, ItemId};

use crate::bail;

struct Food {
    id: ItemId,
    name: &'static str,
    description: &'static str,
    cuisine: &'static str,
    dish_type: &'static str,
    dietary: &'static str,
    ingredients: &'static [&'static str],
    cooking_method: &'static str,
}

const FOODS: &[Food] = &[
    Food {
        id: 1,
        name: "Pizza",
        description: "Italian dish with a round, flattened base of leavened wheat-based dough topped with various ingredients",
        cuisine: "Italian",
        dish_type: "Main",
        dietary: "Vegetarian",
        ingredients: &["Wheat", "Cheese", "Tomato"],
        cooking_method: "Baked",
    },
    Food {
        id: 2,
        name: "Sushi",
        description: "Japanese dish of prepared vinegared rice accompanied by a variety of ingredients such as seafood",
        cuisine: "Japanese",
        dish_type: "Main",
        dietary: "Pescatarian",
        ingredients: &["Rice", "Fish", "Seaweed"],
        cooking_method: "Raw",
    },
    Food {
        id: 3,
        name: "Burger",
        description: "Sandwich consisting of fillings, usually a patty of ground meat placed inside a sliced bun",
        cuisine: "American",
        dish_type: "Main",
        dietary: "Meat",
        ingredients: &["Beef", "Wheat", "Cheese"],
        cooking_method: "Grilled",
    },
    Food {
        id: 4,
        name: "Pasta",
        description: "Italian food made from a dough of flour, water, and eggs, formed into various shapes",
        cuisine: "Italian",
        dish_type: "Main",
        dietary: "Vegetarian",
        ingredients: &["Wheat", "Egg", "Tomato"],
        cooking_method: "Boiled",
    },
    Food {
        id: 5,
        name: "Tacos",
        description: "Traditional Mexican dish consisting of a corn or wheat tortilla folded or rolled around a filling",
        cuisine: "Mexican",
        dish_type: "Main",
        dietary: "Meat",
        ingredients: &["Corn", "Beef", "Tomato"],
        cooking_method: "Grilled",
    },
    Food {
        id: 6,
        name: "Ice Cream",
        description: "A frozen dessert made from cream, milk, and sugar, often with fruits, nuts, or other flavorings",
        cuisine: "International",
        dish_type: "Dessert",
        dietary: "Vegetarian",
        ingredients: &["Dairy", "Sugar"],
        cooking_method: "Frozen",
    },
    Food {
        id: 7,
        name: "Chocolate",
        description: "Sweet food product made from roasted and ground cacao seeds",
        cuisine: "International",
        dish_type: "Dessert",
        dietary: "Vegetarian",
        ingredients: &["Cacao", "Sugar", "Dairy"],
        cooking_method: "Roasted",
    },
    Food {
        id: 8,
        name: "Curry",
        description: "A dish with a sauce seasoned with spices, originally from the Indian subcontinent",
        cuisine: "Indian",
        dish_type: "Main",
        dietary: "Vegetarian",
        ingredients: &["Spices", "Rice", "Vegetables"],
        cooking_method: "Simmered",
    },
    Food {
        id: 9,
        name: "Ramen",
        description: "Japanese noodle soup dish with wheat noodles served in a meat or fish-based broth",
        cuisine: "Japanese",
        dish_type: "Soup",
        dietary: "Meat",
        ingredients: &["Wheat", "Pork", "Egg"],
        cooking_method: "Boiled",
    },
    Food {
        id: 10,
        name: "Steak",
        description: "A slice of meat, typically beef, cut from the fleshy part of an animal or large fish",
        cuisine: "American",
        dish_type: "Main",
        dietary: "Meat",
        ingredients: &["Beef"],
        cooking_method: "Grilled",
    },
];

/// The ten built-in foods, all at the default rating.
pub fn default_catalog() -> Vec<Item> {
    FOODS
        .iter()
        .map(|f| {
            Item::new(f.id, f.name)
                .with_description(f.description)
                .with_categories(
                    Categories::default()
                        .with(CategoryType::Cuisine, f.cuisine)
                        .with(CategoryType::DishType, f.dish_type)
                        .with(CategoryType::Dietary, f.dietary)
                        .with(CategoryType::Ingredient, f.ingredients.to_vec())
                        .with(CategoryType::CookingMethod, f.cooking_method),
                )
        })
        .collect()
}

/// Parse a JSON array of items.
pub fn parse_catalog(content: &str) -> Result<Vec<Item>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Load a catalog file. Exits on unreadable or malformed files.
pub fn load_catalog(path: &Path) -> Vec<Item> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| bail(format!("Failed to read catalog {}: {e}", path.display())));
    let items = parse_catalog(&content)
        .unwrap_or_else(|e| bail(format!("Failed to parse catalog {}: {e}", path.display())));
    if items.len() < 2 {
        bail(format!("Need at least 2 items to rank, {} has {}", path.display(), items.len()));
    }
    items
}

/// Carry ratings from previously saved items over to `items`, matched by id.
/// Returns how many items picked up a saved rating.
pub fn merge_ratings(items: &mut [Item], saved: &[Item]) -> usize {
    let saved_ratings: HashMap<ItemId, f64> = saved.iter().map(|i| (i.id, i.rating)).collect();
    let mut merged = 0;
    for item in items.iter_mut() {
        if let Some(&rating) = saved_ratings.get(&item.id) {
            item.rating = rating;
            merged += 1;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tasteduel_core::constants::DEFAULT_RATING;

    #[test]
    fn test_default_catalog_shape() {
        let items = default_catalog();
        assert_eq!(items.len(), 10);
        let ids: HashSet<ItemId> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 10);
        assert!(items.iter().all(|i| i.rating == DEFAULT_RATING));
        assert!(items.iter().all(|i| i.categories.is_some()));
    }

    #[test]
    fn test_parse_catalog_single_and_list_values() {
        let json = r#"[
            { "id": 1, "name": "Pho", "categories": { "cuisine": "Vietnamese", "ingredient": ["Rice", "Beef"] } },
            { "id": 2, "name": "Bagel", "rating": 1250 }
        ]"#;
        let items = parse_catalog(json).unwrap();
        assert_eq!(items.len(), 2);
        let pho = items[0].categories.as_ref().unwrap();
        assert_eq!(pho.get(CategoryType::Cuisine).unwrap(), &["Vietnamese".to_string()]);
        assert_eq!(pho.get(CategoryType::Ingredient).unwrap().len(), 2);
        assert_eq!(items[0].rating, DEFAULT_RATING);
        assert_eq!(items[1].rating, 1250.0);
        assert!(items[1].categories.is_none());
    }

    #[test]
    fn test_parse_catalog_rejects_garbage() {
        assert!(parse_catalog("not json").is_err());
        assert!(parse_catalog(r#"[{ "name": "no id" }]"#).is_err());
    }

    #[test]
    fn test_merge_ratings() {
        let mut items = default_catalog();
        let saved = vec![Item::new(2, "Sushi").with_rating(1290.0), Item::new(99, "Gone").with_rating(900.0)];
        assert_eq!(merge_ratings(&mut items, &saved), 1);
        assert_eq!(items[1].rating, 1290.0);
        assert_eq!(items[0].rating, DEFAULT_RATING);
    }
}
