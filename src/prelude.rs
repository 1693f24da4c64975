//! Prelude module for Meal Finder Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use meal_finder::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use meal_finder::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = Arc::new(SqliteFavoritesStore::in_memory().await?);
//!     let favorites = FavoritesCoordinator::new(store).await?;
//!     let api = Arc::new(MealDbClient::new()?);
//!     let search = SearchCoordinator::new(SearchConfig::default(), api, favorites.favorite_ids());
//!
//!     search.fetch_default_random_meals().await;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

pub use crate::app::{
    Category,
    ClientConfig,
    FavoriteMeal,
    // Favorites
    FavoritesCoordinator,
    FavoritesStore,
    Ingredient,
    LookupOutcome,
    // Data types
    Meal,
    // Remote API
    MealDbClient,
    RecipeApi,
    SearchConfig,
    // Search orchestration
    SearchCoordinator,
    SearchOutcome,
    SearchSource,
    SortKey,
    SqliteFavoritesStore,
};

pub use crate::config::AppConfig;

pub use std::sync::Arc;

pub use tokio;
