//! Client-side ordering of result lists

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app::models::Meal;

/// Ordering applied to a published result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Order the API returned
    #[default]
    Insertion,
    /// Name, A to Z
    NameAsc,
    /// Name, Z to A
    NameDesc,
    /// Category, then name; meals without a category last
    Category,
    /// Area, then name; meals without an area last
    Area,
    /// Favorites before everything else, then name
    FavoritesFirst,
}

impl SortKey {
    /// All keys, in menu order
    pub const ALL: [SortKey; 6] = [
        SortKey::Insertion,
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::Category,
        SortKey::Area,
        SortKey::FavoritesFirst,
    ];

    /// Name used on the command line and in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Insertion => "insertion",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::Category => "category",
            SortKey::Area => "area",
            SortKey::FavoritesFirst => "favorites-first",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insertion" | "default" | "none" => Ok(SortKey::Insertion),
            "name" | "name-asc" | "az" => Ok(SortKey::NameAsc),
            "name-desc" | "za" => Ok(SortKey::NameDesc),
            "category" => Ok(SortKey::Category),
            "area" | "cuisine" => Ok(SortKey::Area),
            "favorites" | "favorites-first" => Ok(SortKey::FavoritesFirst),
            other => Err(format!(
                "unknown sort '{other}', expected one of: {}",
                SortKey::ALL.map(|k| k.as_str()).join(", ")
            )),
        }
    }
}

/// Re-order `meals` by `key`; ties keep their original relative order
pub fn sort_meals(meals: &[Meal], key: SortKey, favorites: &HashSet<String>) -> Vec<Meal> {
    let mut sorted = meals.to_vec();
    match key {
        SortKey::Insertion => {}
        SortKey::NameAsc => sorted.sort_by(compare_names),
        SortKey::NameDesc => sorted.sort_by(|a, b| compare_names(b, a)),
        SortKey::Category => sorted.sort_by(|a, b| {
            compare_missing_last(a.category.as_deref(), b.category.as_deref())
                .then_with(|| compare_names(a, b))
        }),
        SortKey::Area => sorted.sort_by(|a, b| {
            compare_missing_last(a.area.as_deref(), b.area.as_deref())
                .then_with(|| compare_names(a, b))
        }),
        SortKey::FavoritesFirst => sorted.sort_by(|a, b| {
            let a_fav = a.id().is_some_and(|id| favorites.contains(id));
            let b_fav = b.id().is_some_and(|id| favorites.contains(id));
            b_fav.cmp(&a_fav).then_with(|| compare_names(a, b))
        }),
    }
    sorted
}

fn compare_names(a: &Meal, b: &Meal) -> Ordering {
    a.display_name()
        .to_lowercase()
        .cmp(&b.display_name().to_lowercase())
}

fn compare_missing_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
