use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_RATING;
use crate::engine::SessionError;

/// Caller-provided item identifier. Immutable for the life of an item.
pub type ItemId = i64;

/// The kinds of categorical metadata an item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CategoryType {
    Cuisine,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    DishType,
    Dietary,
    Ingredient,
    CookingMethod,
}

impl CategoryType {
    pub const ALL: [CategoryType; 5] = [
        CategoryType::Cuisine,
        CategoryType::DishType,
        CategoryType::Dietary,
        CategoryType::Ingredient,
        CategoryType::CookingMethod,
    ];

    /// Key used in persisted data and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryType::Cuisine => "cuisine",
            CategoryType::DishType => "type",
            CategoryType::Dietary => "dietary",
            CategoryType::Ingredient => "ingredient",
            CategoryType::CookingMethod => "cookingMethod",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category type \"{0}\" (expected one of: cuisine, type, dietary, ingredient, cookingMethod)")]
pub struct UnknownCategoryType(pub String);

impl FromStr for CategoryType {
    type Err = UnknownCategoryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .or_else(|| match s.to_ascii_lowercase().as_str() {
                "dish-type" | "dish_type" | "dishtype" => Some(CategoryType::DishType),
                "cooking-method" | "cooking_method" => Some(CategoryType::CookingMethod),
                _ => None,
            })
            .ok_or_else(|| UnknownCategoryType(s.to_string()))
    }
}

/// A category entry: either one value or a set of values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CategoryValue {
    One(String),
    Many(Vec<String>),
}

impl CategoryValue {
    /// Single values are viewed as one-element sets.
    pub fn values(&self) -> &[String] {
        match self {
            CategoryValue::One(v) => std::slice::from_ref(v),
            CategoryValue::Many(vs) => vs,
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, CategoryValue::One(v) if v.is_empty())
    }
}

impl From<&str> for CategoryValue {
    fn from(v: &str) -> Self {
        CategoryValue::One(v.to_string())
    }
}

impl From<Vec<&str>> for CategoryValue {
    fn from(vs: Vec<&str>) -> Self {
        CategoryValue::Many(vs.into_iter().map(str::to_string).collect())
    }
}

/// Categorical metadata of an item. Every type is optional and open-ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Categories {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub cuisine: Option<CategoryValue>,
    #[cfg_attr(feature = "serde", serde(rename = "type", skip_serializing_if = "Option::is_none"))]
    pub dish_type: Option<CategoryValue>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub dietary: Option<CategoryValue>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub ingredient: Option<CategoryValue>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub cooking_method: Option<CategoryValue>,
}

impl Categories {
    /// Values for one category type, or `None` when the item has no usable value.
    pub fn get(&self, category_type: CategoryType) -> Option<&[String]> {
        let value = match category_type {
            CategoryType::Cuisine => &self.cuisine,
            CategoryType::DishType => &self.dish_type,
            CategoryType::Dietary => &self.dietary,
            CategoryType::Ingredient => &self.ingredient,
            CategoryType::CookingMethod => &self.cooking_method,
        };
        value.as_ref().filter(|v| !v.is_blank()).map(CategoryValue::values)
    }

    pub fn set(&mut self, category_type: CategoryType, value: CategoryValue) {
        let slot = match category_type {
            CategoryType::Cuisine => &mut self.cuisine,
            CategoryType::DishType => &mut self.dish_type,
            CategoryType::Dietary => &mut self.dietary,
            CategoryType::Ingredient => &mut self.ingredient,
            CategoryType::CookingMethod => &mut self.cooking_method,
        };
        *slot = Some(value);
    }

    pub fn with(mut self, category_type: CategoryType, value: impl Into<CategoryValue>) -> Self {
        self.set(category_type, value.into());
        self
    }
}

#[cfg(feature = "serde")]
fn default_rating() -> f64 {
    DEFAULT_RATING
}

/// A rankable item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Only ever changed by a completed comparison (or a reset).
    #[cfg_attr(feature = "serde", serde(default = "default_rating"))]
    pub rating: f64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub categories: Option<Categories>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Item {
            id,
            name: name.into(),
            description: String::new(),
            rating: DEFAULT_RATING,
            categories: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_categories(mut self, categories: Categories) -> Self {
        self.categories = Some(categories);
        self
    }
}

/// One completed head-to-head choice.
///
/// Fields are optional because history may come back from an external store
/// in any shape; every consumer skips records missing what it needs.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ComparisonRecord {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::item"))]
    pub item_a: Option<Item>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::item"))]
    pub item_b: Option<Item>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::item"))]
    pub winner: Option<Item>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::item"))]
    pub loser: Option<Item>,
    /// Milliseconds since the Unix epoch.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::timestamp"))]
    pub timestamp: u64,
}

impl ComparisonRecord {
    pub fn new(item_a: Item, item_b: Item, a_won: bool, timestamp: u64) -> Self {
        let (winner, loser) = if a_won {
            (item_a.clone(), item_b.clone())
        } else {
            (item_b.clone(), item_a.clone())
        };
        ComparisonRecord {
            item_a: Some(item_a),
            item_b: Some(item_b),
            winner: Some(winner),
            loser: Some(loser),
            timestamp,
        }
    }

    /// Both compared items, if present.
    pub fn pair(&self) -> Option<(&Item, &Item)> {
        Some((self.item_a.as_ref()?, self.item_b.as_ref()?))
    }

    /// 1.0 when item A won, 0.0 otherwise. `None` if the record lacks A or the winner.
    pub fn outcome_a(&self) -> Option<f64> {
        let a = self.item_a.as_ref()?;
        let winner = self.winner.as_ref()?;
        Some(if winner.id == a.id { 1.0 } else { 0.0 })
    }

    /// Whether this record compared `a` and `b`, in either order.
    pub fn involves_pair(&self, a: ItemId, b: ItemId) -> bool {
        match self.pair() {
            Some((x, y)) => (x.id == a && y.id == b) || (x.id == b && y.id == a),
            None => false,
        }
    }
}

/// Decoders for history loaded from an external store. A malformed value
/// degrades to "absent" instead of failing the whole document.
#[cfg(feature = "serde")]
pub(crate) mod lenient {
    use serde::de::{Deserialize, Deserializer, IgnoredAny};

    use super::{ComparisonRecord, Item};

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MaybeItem {
        Item(Item),
        Malformed(IgnoredAny),
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MaybeTimestamp {
        Millis(u64),
        Float(f64),
        Malformed(IgnoredAny),
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MaybeRecord {
        Record(ComparisonRecord),
        Malformed(IgnoredAny),
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MaybeHistory {
        List(Vec<MaybeRecord>),
        Malformed(IgnoredAny),
    }

    pub fn item<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Item>, D::Error> {
        Ok(match MaybeItem::deserialize(deserializer)? {
            MaybeItem::Item(item) => Some(item),
            MaybeItem::Malformed(_) => None,
        })
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        Ok(match MaybeTimestamp::deserialize(deserializer)? {
            MaybeTimestamp::Millis(ms) => ms,
            MaybeTimestamp::Float(ms) if ms.is_finite() && ms >= 0.0 => ms as u64,
            MaybeTimestamp::Float(_) | MaybeTimestamp::Malformed(_) => 0,
        })
    }

    /// Anything that is not a record becomes an empty (inert) record, and a
    /// history that is not a list becomes an empty history.
    pub fn history<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ComparisonRecord>, D::Error> {
        Ok(match MaybeHistory::deserialize(deserializer)? {
            MaybeHistory::List(records) => records
                .into_iter()
                .map(|r| match r {
                    MaybeRecord::Record(record) => record,
                    MaybeRecord::Malformed(_) => ComparisonRecord::default(),
                })
                .collect(),
            MaybeHistory::Malformed(_) => Vec::new(),
        })
    }
}

/// Predicted outcome of a hypothetical comparison. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// P(item A wins), in [0, 1].
    pub expected_outcome_a: f64,
    /// How much to trust `expected_outcome_a`, in [0, 1].
    pub confidence: f64,
}

impl Prediction {
    /// Coin flip with no confidence at all.
    pub fn uninformed() -> Self {
        Prediction {
            expected_outcome_a: 0.5,
            confidence: 0.0,
        }
    }
}

/// Per-session preferences for pair selection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SelectionOptions {
    /// Favor refining close ratings over exploring uncertain pairs once past
    /// the exploration phase.
    pub prioritize_close_ratings: bool,
    /// Accepted values per category type. AND across types, OR within a type.
    pub selected_categories: BTreeMap<CategoryType, Vec<String>>,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        SelectionOptions {
            prioritize_close_ratings: true,
            selected_categories: BTreeMap::new(),
        }
    }
}

impl SelectionOptions {
    pub fn has_active_filters(&self) -> bool {
        self.selected_categories.values().any(|values| !values.is_empty())
    }
}

/// Maps between caller-provided item IDs and positions in the catalog.
pub(crate) struct IdMap {
    id_to_idx: HashMap<ItemId, usize>,
}

impl IdMap {
    pub fn from_items(items: &[Item]) -> Result<Self, SessionError> {
        let mut id_to_idx = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if id_to_idx.insert(item.id, idx).is_some() {
                return Err(SessionError::DuplicateItemId(item.id));
            }
        }
        Ok(IdMap { id_to_idx })
    }

    pub fn to_idx(&self, id: ItemId) -> Option<usize> {
        self.id_to_idx.get(&id).copied()
    }
}
