//! Search orchestration and result publishing
//!
//! This module provides [`SearchCoordinator`], the layer between the recipe
//! API and whatever presents results. It runs searches, enriches partial
//! records, keeps at most one operation per family in flight, and publishes
//! results, a loading flag and error messages as observable state.
//!
//! # Architecture
//!
//! - [`config`] - Coordinator settings
//! - [`cascade`] - Name → area → category fallback
//! - [`enrichment`] - Lookup-by-id for partial filter results
//! - [`sorting`] - Client-side ordering
//! - [`state`] - Observable state cells
//! - [`tasks`] - Per-family cancellation slots
//! - [`signals`] - Ctrl+C handling for interactive front ends
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use meal_finder::app::{MealDbClient, SearchConfig, SearchCoordinator, SearchOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(MealDbClient::new()?);
//! let coordinator = SearchCoordinator::without_favorites(SearchConfig::default(), api);
//!
//! if let SearchOutcome::Found { meals, source } = coordinator.search_by_name_cascading("Italian").await {
//!     println!("{} meals matched by {}", meals.len(), source);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cascade;
pub mod config;
pub mod enrichment;
pub mod signals;
pub mod sorting;
pub mod state;
pub mod tasks;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::app::client::RecipeApi;
use crate::app::models::{Category, Meal};
use crate::constants::search;
use crate::errors::ApiResult;

pub use cascade::{first_non_empty, CascadeHit, CascadeStep, SearchSource};
pub use config::SearchConfig;
pub use enrichment::enrich_meals;
pub use signals::{cancel_on_interrupt, wait_for_interrupt};
pub use sorting::{sort_meals, SortKey};
pub use state::{LoadingGuard, SearchState};
pub use tasks::{TaskSlot, Ticket};

/// Result of a search-family or random operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchOutcome {
    /// Results were found and published
    Found {
        source: SearchSource,
        meals: Vec<Meal>,
    },
    /// Nothing matched; the message was published as the error
    NoResults { message: String },
    /// A remote call failed; the message was published as the error
    Failed { message: String },
    /// A newer operation superseded this one; nothing was published
    Cancelled,
    /// Identical query repeated inside the debounce window; no request made
    Debounced,
    /// Blank input; no request made
    Ignored,
}

impl SearchOutcome {
    /// Published meals, empty for every other outcome
    pub fn meals(&self) -> &[Meal] {
        match self {
            SearchOutcome::Found { meals, .. } => meals,
            _ => &[],
        }
    }
}

/// Result of a single lookup by identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LookupOutcome {
    Found(Meal),
    NotFound,
    Failed(String),
}

/// State shared with spawned operation tasks
struct Shared {
    api: Arc<dyn RecipeApi>,
    config: SearchConfig,
    state: Arc<SearchState>,
    favorite_ids: watch::Receiver<HashSet<String>>,
}

impl Shared {
    fn finish_found(&self, ticket: &Ticket, source: SearchSource, meals: Vec<Meal>) -> SearchOutcome {
        ticket
            .publish_if_current(|| {
                let favorites = self.favorite_ids.borrow().clone();
                let meals = self.state.publish_results(meals, &favorites);
                self.state.clear_error();
                info!("Published {} meals from {} search", meals.len(), source);
                SearchOutcome::Found { source, meals }
            })
            .unwrap_or(SearchOutcome::Cancelled)
    }

    fn finish_empty(&self, ticket: &Ticket, message: String) -> SearchOutcome {
        ticket
            .publish_if_current(|| {
                let favorites = self.favorite_ids.borrow().clone();
                self.state.publish_results(Vec::new(), &favorites);
                self.state.set_error(message.clone());
                info!("{}", message);
                SearchOutcome::NoResults { message }
            })
            .unwrap_or(SearchOutcome::Cancelled)
    }

    fn finish_failed(&self, ticket: &Ticket, message: String) -> SearchOutcome {
        ticket
            .publish_if_current(|| {
                self.state.set_error(message.clone());
                warn!("{}", message);
                SearchOutcome::Failed { message }
            })
            .unwrap_or(SearchOutcome::Cancelled)
    }
}

/// Coordinates searches, random suggestions and lookups
///
/// Search-family operations (cascade, area, category) share one task slot and
/// random suggestions have their own; starting an operation cancels the
/// in-flight one of the same family.
pub struct SearchCoordinator {
    shared: Arc<Shared>,
    search_slot: TaskSlot,
    random_slot: TaskSlot,
    last_query: Mutex<Option<(String, Instant)>>,
}

impl SearchCoordinator {
    /// Create a coordinator that reads favorite membership from `favorite_ids`
    pub fn new(
        config: SearchConfig,
        api: Arc<dyn RecipeApi>,
        favorite_ids: watch::Receiver<HashSet<String>>,
    ) -> Self {
        let state = Arc::new(SearchState::new(config.default_sort));
        Self {
            shared: Arc::new(Shared {
                api,
                config,
                state,
                favorite_ids,
            }),
            search_slot: TaskSlot::new("search"),
            random_slot: TaskSlot::new("random"),
            last_query: Mutex::new(None),
        }
    }

    /// Create a coordinator with an empty, fixed favorites set
    pub fn without_favorites(config: SearchConfig, api: Arc<dyn RecipeApi>) -> Self {
        let (_, favorite_ids) = watch::channel(HashSet::new());
        Self::new(config, api, favorite_ids)
    }

    /// Search by name, falling back to area then category
    ///
    /// Blank queries and identical queries repeated within the debounce
    /// window return without issuing any request.
    pub async fn search_by_name_cascading(&self, query: &str) -> SearchOutcome {
        let query = query.trim().to_string();
        if query.is_empty() {
            return SearchOutcome::Ignored;
        }
        if self.is_debounced(&query) {
            debug!("Ignoring repeated query \"{}\"", query);
            return SearchOutcome::Debounced;
        }

        info!("Searching for \"{}\"", query);
        self.run(&self.search_slot, move |shared, ticket| async move {
            let steps = cascade::name_area_category(
                shared.api.clone(),
                query.clone(),
                shared.config.max_concurrent_requests,
            );
            match first_non_empty(steps).await {
                Ok(Some(hit)) => shared.finish_found(&ticket, hit.source, hit.meals),
                Ok(None) => {
                    shared.finish_empty(&ticket, format!("No results found for \"{query}\""))
                }
                Err(e) => shared.finish_failed(&ticket, format!("Search failed: {e}")),
            }
        })
        .await
    }

    /// Meals from one area / cuisine, enriched
    pub async fn search_by_area(&self, area: &str) -> SearchOutcome {
        let area = area.trim().to_string();
        if area.is_empty() {
            return SearchOutcome::Ignored;
        }

        info!("Filtering by area \"{}\"", area);
        self.run(&self.search_slot, move |shared, ticket| async move {
            shared
                .filter_and_enrich(&ticket, SearchSource::Area, &area, shared.api.filter_by_area(&area))
                .await
        })
        .await
    }

    /// Meals from one category, enriched
    pub async fn search_by_category(&self, category: &str) -> SearchOutcome {
        let category = category.trim().to_string();
        if category.is_empty() {
            return SearchOutcome::Ignored;
        }

        info!("Filtering by category \"{}\"", category);
        self.run(&self.search_slot, move |shared, ticket| async move {
            shared
                .filter_and_enrich(
                    &ticket,
                    SearchSource::Category,
                    &category,
                    shared.api.filter_by_category(&category),
                )
                .await
        })
        .await
    }

    /// Fetch `count` random meals with independent requests
    ///
    /// Failed or empty requests are dropped; the operation only fails when
    /// none succeeded.
    pub async fn fetch_random_meals(&self, count: usize) -> SearchOutcome {
        if count == 0 {
            return SearchOutcome::Ignored;
        }

        info!("Fetching {} random meals", count);
        self.run(&self.random_slot, move |shared, ticket| async move {
            let api = shared.api.clone();
            let results: Vec<ApiResult<Option<Meal>>> = stream::iter(0..count)
                .map(|_| api.random_meal())
                .buffered(shared.config.max_concurrent_requests.max(1))
                .collect()
                .await;

            let mut meals = Vec::with_capacity(count);
            let mut failures = 0;
            for result in results {
                match result {
                    Ok(Some(meal)) => meals.push(meal),
                    Ok(None) => failures += 1,
                    Err(e) => {
                        debug!("Random meal request failed: {}", e);
                        failures += 1;
                    }
                }
            }

            if meals.is_empty() {
                return shared.finish_failed(&ticket, search::RANDOM_FAILED_MESSAGE.to_string());
            }
            if failures > 0 {
                warn!("{} of {} random meal requests failed", failures, count);
            }
            shared.finish_found(&ticket, SearchSource::Random, meals)
        })
        .await
    }

    /// Random meals using the configured default count
    pub async fn fetch_default_random_meals(&self) -> SearchOutcome {
        self.fetch_random_meals(self.shared.config.random_count).await
    }

    /// Look up one meal; does not touch the published result list
    pub async fn fetch_meal_by_id(&self, id: &str) -> LookupOutcome {
        let id = id.trim();
        if id.is_empty() {
            return LookupOutcome::NotFound;
        }

        match self.shared.api.lookup_by_id(id).await {
            Ok(Some(meal)) => LookupOutcome::Found(meal),
            Ok(None) => {
                info!("Meal {} not found", id);
                LookupOutcome::NotFound
            }
            Err(e) => {
                let message = format!("Failed to load meal {id}: {e}");
                warn!("{}", message);
                self.shared.state.set_error(message.clone());
                LookupOutcome::Failed(message)
            }
        }
    }

    /// All area names; failures are also published as the error
    pub async fn list_areas(&self) -> ApiResult<Vec<String>> {
        self.shared
            .api
            .list_areas()
            .await
            .inspect_err(|e| self.shared.state.set_error(format!("Failed to load areas: {e}")))
    }

    /// All categories; failures are also published as the error
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.shared
            .api
            .list_categories()
            .await
            .inspect_err(|e| {
                self.shared
                    .state
                    .set_error(format!("Failed to load categories: {e}"))
            })
    }

    /// Re-order the published results; the key sticks for later results
    pub fn apply_sort(&self, key: SortKey) -> Vec<Meal> {
        debug!("Sorting results by {}", key);
        let favorites = self.shared.favorite_ids.borrow().clone();
        self.shared.state.resort(key, &favorites)
    }

    /// Reset the error observable
    pub fn clear_error(&self) {
        self.shared.state.clear_error();
    }

    /// Cancel every in-flight operation
    pub fn cancel_all(&self) {
        self.search_slot.cancel();
        self.random_slot.cancel();
    }

    /// Current sort key
    pub fn sort_key(&self) -> SortKey {
        self.shared.state.sort_key()
    }

    /// Published result list
    pub fn meals(&self) -> watch::Receiver<Vec<Meal>> {
        self.shared.state.subscribe_meals()
    }

    /// Loading flag
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.shared.state.subscribe_loading()
    }

    /// Last error message
    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.shared.state.subscribe_error()
    }

    /// Coordinator configuration
    pub fn config(&self) -> &SearchConfig {
        &self.shared.config
    }

    fn is_debounced(&self, query: &str) -> bool {
        let now = Instant::now();
        let mut last = self.last_query.lock().unwrap_or_else(PoisonError::into_inner);
        let repeated = matches!(
            last.as_ref(),
            Some((previous, at)) if previous == query
                && now.duration_since(*at) < self.shared.config.debounce_window
        );
        if !repeated {
            *last = Some((query.to_string(), now));
        }
        repeated
    }

    /// Spawn `work` as the current task of `slot` and wait for its outcome
    async fn run<F, Fut>(&self, slot: &TaskSlot, work: F) -> SearchOutcome
    where
        F: FnOnce(Arc<Shared>, Ticket) -> Fut,
        Fut: Future<Output = SearchOutcome> + Send + 'static,
    {
        let ticket = slot.begin();
        self.shared.state.clear_error();
        let loading = self.shared.state.start_loading();

        let fut = work(self.shared.clone(), ticket.clone());
        let handle = tokio::spawn(async move {
            let outcome = fut.await;
            drop(loading);
            outcome
        });
        slot.attach(&ticket, handle.abort_handle());

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                debug!("Operation superseded before completion");
                SearchOutcome::Cancelled
            }
            Err(e) => {
                error!("Search task failed: {}", e);
                self.shared.finish_failed(&ticket, format!("Search failed: {e}"))
            }
        }
    }
}

impl Shared {
    async fn filter_and_enrich(
        &self,
        ticket: &Ticket,
        source: SearchSource,
        value: &str,
        filter: impl Future<Output = ApiResult<Vec<Meal>>>,
    ) -> SearchOutcome {
        match filter.await {
            Ok(meals) if meals.is_empty() => {
                self.finish_empty(ticket, format!("No results found for {source} \"{value}\""))
            }
            Ok(meals) => {
                let meals =
                    enrich_meals(self.api.as_ref(), meals, self.config.max_concurrent_requests)
                        .await;
                self.finish_found(ticket, source, meals)
            }
            Err(e) => self.finish_failed(ticket, format!("Failed to load {source} \"{value}\": {e}")),
        }
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
