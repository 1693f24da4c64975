//! Core application logic for Meal Finder
//!
//! This module contains the recipe API client, data models, the search
//! coordinator and the favorites store.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use meal_finder::app::{
//!     FavoritesCoordinator, MealDbClient, SearchConfig, SearchCoordinator, SqliteFavoritesStore,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteFavoritesStore::in_memory().await?);
//! let favorites = FavoritesCoordinator::new(store).await?;
//!
//! let api = Arc::new(MealDbClient::new()?);
//! let search = SearchCoordinator::new(SearchConfig::default(), api, favorites.favorite_ids());
//!
//! let outcome = search.search_by_name_cascading("Arrabiata").await;
//! if let Some(meal) = outcome.meals().first() {
//!     favorites.toggle(meal).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coordinator;
pub mod favorites;
pub mod models;

// Re-export main public API
pub use client::{ClientConfig, MealDbClient, RecipeApi};
pub use coordinator::{
    cancel_on_interrupt, LookupOutcome, SearchConfig, SearchCoordinator, SearchOutcome,
    SearchSource, SortKey,
};
pub use favorites::{FavoritesCoordinator, FavoritesStore, SqliteFavoritesStore};
pub use models::{Category, FavoriteMeal, Ingredient, Meal};
