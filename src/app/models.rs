//! Data models for Meal Finder
//!
//! This module defines the core data structures used throughout the application:
//! meals as decoded from TheMealDB, their ingredient lists, categories, and the
//! denormalized favorite records kept in the local store.
//!
//! TheMealDB encodes ingredients as twenty numbered `strIngredientN` /
//! `strMeasureN` fields and uses empty strings and `null` interchangeably for
//! missing values. Decoding goes through [`MealRecord`] which normalizes both
//! into `None` and folds the numbered slots into a list.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{favorites, search};

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    /// Ingredient name, e.g. "Chicken Thighs"
    pub name: String,
    /// Free-text quantity, e.g. "2 tbs"
    pub measure: Option<String>,
}

/// A recipe record fetched from the remote API
///
/// Records returned by the filter endpoints only carry id, name and thumbnail;
/// see [`Meal::is_partial`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MealRecord")]
pub struct Meal {
    pub id: Option<String>,
    pub name: Option<String>,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub tags: Vec<String>,
    pub youtube: Option<String>,
    pub source: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

impl Meal {
    /// Create a meal carrying only the fields filter endpoints return
    pub fn partial(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            thumbnail: None,
            category: None,
            area: None,
            instructions: None,
            tags: Vec::new(),
            youtube: None,
            source: None,
            ingredients: Vec::new(),
        }
    }

    /// Builder-style setter for category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(Some(category.into()));
        self
    }

    /// Builder-style setter for area
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = non_blank(Some(area.into()));
        self
    }

    /// Identifier, if the record carried one
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Name for display, falling back to the unknown-meal placeholder
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(favorites::UNKNOWN_MEAL_NAME)
    }

    /// True when category or area is missing and a lookup could fill them in
    pub fn is_partial(&self) -> bool {
        self.category.is_none() || self.area.is_none()
    }
}

/// Wire shape of a TheMealDB meal object
#[derive(Debug, Deserialize)]
struct MealRecord {
    #[serde(rename = "idMeal", default)]
    id: Option<String>,
    #[serde(rename = "strMeal", default)]
    name: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    thumbnail: Option<String>,
    #[serde(rename = "strCategory", default)]
    category: Option<String>,
    #[serde(rename = "strArea", default)]
    area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    instructions: Option<String>,
    #[serde(rename = "strTags", default)]
    tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    youtube: Option<String>,
    #[serde(rename = "strSource", default)]
    source: Option<String>,
    #[serde(flatten)]
    slots: HashMap<String, serde_json::Value>,
}

impl From<MealRecord> for Meal {
    fn from(record: MealRecord) -> Self {
        let slot = |key: String| -> Option<String> {
            record
                .slots
                .get(&key)
                .and_then(|value| value.as_str())
                .and_then(|text| non_blank(Some(text.to_string())))
        };

        let ingredients = (1..=search::MAX_INGREDIENTS)
            .filter_map(|n| {
                let name = slot(format!("strIngredient{n}"))?;
                Some(Ingredient {
                    name,
                    measure: slot(format!("strMeasure{n}")),
                })
            })
            .collect();

        let tags = record
            .tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: non_blank(record.id),
            name: non_blank(record.name),
            thumbnail: non_blank(record.thumbnail),
            category: non_blank(record.category),
            area: non_blank(record.area),
            instructions: non_blank(record.instructions),
            tags,
            youtube: non_blank(record.youtube),
            source: non_blank(record.source),
            ingredients,
        }
    }
}

/// A meal category as returned by `categories.php`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "idCategory")]
    pub id: String,
    #[serde(rename = "strCategory")]
    pub name: String,
    #[serde(rename = "strCategoryThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strCategoryDescription", default)]
    pub description: Option<String>,
}

/// Entry of the `list.php?a=list` response
#[derive(Debug, Deserialize)]
pub(crate) struct AreaRecord {
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
}

/// `{"meals": [...]}` envelope; `null`, missing or non-list means empty
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub(crate) struct MealsEnvelope<T> {
    #[serde(default, deserialize_with = "lenient_list")]
    pub meals: Vec<T>,
}

/// `{"categories": [...]}` envelope
#[derive(Debug, Deserialize)]
pub(crate) struct CategoriesEnvelope {
    #[serde(default, deserialize_with = "lenient_list")]
    pub categories: Vec<Category>,
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(value @ serde_json::Value::Array(_)) => {
            serde_json::from_value(value).map_err(D::Error::custom)
        }
        _ => Ok(Vec::new()),
    }
}

/// A persisted, denormalized copy of a meal the user favorited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteMeal {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FavoriteMeal {
    /// Derive a favorite from a meal; `None` when the meal has no identifier
    pub fn from_meal(meal: &Meal, created_at: DateTime<Utc>) -> Option<Self> {
        let id = meal.id()?.to_string();
        Some(Self {
            id,
            name: meal.display_name().to_string(),
            thumbnail: meal.thumbnail.clone(),
            category: meal.category.clone(),
            area: meal.area.clone(),
            created_at,
        })
    }
}

/// Trim and drop blank strings
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == text.len() {
            Some(text)
        } else {
            Some(trimmed.to_string())
        }
    })
}
