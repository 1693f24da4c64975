//! Unit tests for the search coordinator
//!
//! These drive [`SearchCoordinator`] against [`ScriptedApi`], an in-process
//! fake whose answers, delays and failures are set per test. End-to-end tests
//! over HTTP live in the top-level tests directory.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::app::client::RecipeApi;
use crate::app::models::{Category, Meal};
use crate::errors::{ApiError, ApiResult};

use super::*;

/// Scripted recipe API
#[derive(Default)]
pub struct ScriptedApi {
    by_name: HashMap<String, Vec<Meal>>,
    by_area: HashMap<String, Vec<Meal>>,
    by_category: HashMap<String, Vec<Meal>>,
    full: HashMap<String, Meal>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    random_fail_every: Option<usize>,
    random_always_fails: bool,
    /// The first this-many random calls take 200ms
    slow_random_calls: usize,
    calls: Mutex<Vec<String>>,
    random_calls: AtomicUsize,
}

impl ScriptedApi {
    fn name(mut self, query: &str, meals: Vec<Meal>) -> Self {
        self.by_name.insert(query.to_string(), meals);
        self
    }

    fn area(mut self, area: &str, meals: Vec<Meal>) -> Self {
        self.by_area.insert(area.to_string(), meals);
        self
    }

    fn category(mut self, category: &str, meals: Vec<Meal>) -> Self {
        self.by_category.insert(category.to_string(), meals);
        self
    }

    fn full(mut self, meal: Meal) -> Self {
        let id = meal.id().unwrap().to_string();
        self.full.insert(id, meal);
        self
    }

    fn delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, kind: &str, key: &str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(format!("{kind}:{key}"));
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(key) {
            return Err(ApiError::ServerError { status: 500 });
        }
        Ok(())
    }
}

#[async_trait]
impl RecipeApi for ScriptedApi {
    async fn search_by_name(&self, name: &str) -> ApiResult<Vec<Meal>> {
        self.record("name", name).await?;
        Ok(self.by_name.get(name).cloned().unwrap_or_default())
    }

    async fn lookup_by_id(&self, id: &str) -> ApiResult<Option<Meal>> {
        self.record("lookup", id).await?;
        Ok(self.full.get(id).cloned())
    }

    async fn random_meal(&self) -> ApiResult<Option<Meal>> {
        let n = self.random_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.slow_random_calls {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        if self.random_always_fails || self.random_fail_every.is_some_and(|every| n % every == 0) {
            return Err(ApiError::ServerError { status: 503 });
        }
        Ok(Some(full_meal(&format!("r{n}"), &format!("Random {n}"))))
    }

    async fn filter_by_area(&self, area: &str) -> ApiResult<Vec<Meal>> {
        self.record("area", area).await?;
        Ok(self.by_area.get(area).cloned().unwrap_or_default())
    }

    async fn filter_by_category(&self, category: &str) -> ApiResult<Vec<Meal>> {
        self.record("category", category).await?;
        Ok(self.by_category.get(category).cloned().unwrap_or_default())
    }

    async fn list_areas(&self) -> ApiResult<Vec<String>> {
        Ok(self.by_area.keys().cloned().collect())
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(Vec::new())
    }
}

fn full_meal(id: &str, name: &str) -> Meal {
    Meal::partial(id, name).with_category("Pasta").with_area("Italian")
}

fn test_config() -> SearchConfig {
    SearchConfig::default()
        .with_debounce_window(Duration::from_millis(50))
        .with_max_concurrent_requests(4)
}

fn coordinator(api: ScriptedApi) -> (Arc<ScriptedApi>, SearchCoordinator) {
    let api = Arc::new(api);
    let coordinator = SearchCoordinator::without_favorites(test_config(), api.clone());
    (api, coordinator)
}

/// Test that a name hit wins without touching the fallbacks
#[tokio::test]
async fn test_cascade_name_hit() {
    let (api, coordinator) = coordinator(
        ScriptedApi::default().name("carbonara", vec![full_meal("1", "Spaghetti Carbonara")]),
    );

    let outcome = coordinator.search_by_name_cascading("carbonara").await;

    match outcome {
        SearchOutcome::Found { source, meals } => {
            assert_eq!(source, SearchSource::Name);
            assert_eq!(meals.len(), 1);
        }
        other => panic!("Expected Found, got {:?}", other),
    }
    assert_eq!(api.calls(), vec!["name:carbonara"]);
    assert_eq!(coordinator.meals().borrow().len(), 1);
    assert!(!*coordinator.loading().borrow());
}

/// Test fallback to the area filter, with enrichment of its partial results
#[tokio::test]
async fn test_cascade_falls_back_to_area() {
    let (api, coordinator) = coordinator(
        ScriptedApi::default()
            .area("Italian", vec![Meal::partial("10", "Lasagne")])
            .full(full_meal("10", "Lasagne")),
    );

    let outcome = coordinator.search_by_name_cascading("Italian").await;

    let SearchOutcome::Found { source, meals } = outcome else {
        panic!("Expected Found");
    };
    assert_eq!(source, SearchSource::Area);
    assert_eq!(meals[0].category.as_deref(), Some("Pasta"));
    assert_eq!(api.calls(), vec!["name:Italian", "area:Italian", "lookup:10"]);
}

/// Test fallback all the way to the category filter
#[tokio::test]
async fn test_cascade_falls_back_to_category() {
    let (api, coordinator) = coordinator(
        ScriptedApi::default().category("Seafood", vec![full_meal("20", "Fish pie")]),
    );

    let outcome = coordinator.search_by_name_cascading("Seafood").await;

    assert!(matches!(
        outcome,
        SearchOutcome::Found {
            source: SearchSource::Category,
            ..
        }
    ));
    assert_eq!(
        api.calls(),
        vec!["name:Seafood", "area:Seafood", "category:Seafood"]
    );
}

/// Test that an exhausted cascade reports no results through the error cell
#[tokio::test]
async fn test_cascade_no_results() {
    let (_api, coordinator) = coordinator(ScriptedApi::default());

    let outcome = coordinator.search_by_name_cascading("zzz").await;

    assert_eq!(
        outcome,
        SearchOutcome::NoResults {
            message: "No results found for \"zzz\"".to_string()
        }
    );
    assert_eq!(
        coordinator.error().borrow().as_deref(),
        Some("No results found for \"zzz\"")
    );
    assert!(coordinator.meals().borrow().is_empty());
    assert!(!*coordinator.loading().borrow());
}

/// Test that a transport failure is published and stops the cascade
#[tokio::test]
async fn test_cascade_failure_is_reported() {
    let (api, coordinator) = coordinator(ScriptedApi::default().failing("boom"));

    let outcome = coordinator.search_by_name_cascading("boom").await;

    assert!(matches!(outcome, SearchOutcome::Failed { .. }));
    assert!(coordinator.error().borrow().is_some());
    assert_eq!(api.calls(), vec!["name:boom"]);
}

/// Test blank and repeated queries issue no requests
#[tokio::test]
async fn test_blank_and_debounced_queries() {
    let (api, coordinator) = coordinator(
        ScriptedApi::default().name("soup", vec![full_meal("1", "Soup")]),
    );

    assert_eq!(
        coordinator.search_by_name_cascading("   ").await,
        SearchOutcome::Ignored
    );

    assert!(matches!(
        coordinator.search_by_name_cascading("soup").await,
        SearchOutcome::Found { .. }
    ));
    assert_eq!(
        coordinator.search_by_name_cascading(" soup ").await,
        SearchOutcome::Debounced
    );
    assert_eq!(api.calls(), vec!["name:soup"]);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(matches!(
        coordinator.search_by_name_cascading("soup").await,
        SearchOutcome::Found { .. }
    ));
    assert_eq!(api.calls().len(), 2);
}

/// Test a later search supersedes an earlier in-flight one
#[tokio::test]
async fn test_new_search_cancels_previous() {
    let (_api, coordinator) = coordinator(
        ScriptedApi::default()
            .name("chicken", vec![full_meal("1", "Chicken Curry")])
            .name("beef", vec![full_meal("2", "Beef Stew")])
            .delay("chicken", Duration::from_millis(200)),
    );
    let coordinator = Arc::new(coordinator);

    let slow = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.search_by_name_cascading("chicken").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let fast = coordinator.search_by_name_cascading("beef").await;
    assert!(matches!(fast, SearchOutcome::Found { .. }));
    assert_eq!(slow.await.unwrap(), SearchOutcome::Cancelled);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let published = coordinator.meals().borrow().clone();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].display_name(), "Beef Stew");
    assert!(!*coordinator.loading().borrow());
}

/// Test a filter search supersedes an in-flight cascade
#[tokio::test]
async fn test_area_search_cancels_cascade() {
    let (_api, coordinator) = coordinator(
        ScriptedApi::default()
            .name("chicken", vec![full_meal("1", "Chicken Curry")])
            .delay("chicken", Duration::from_millis(200))
            .area("Thai", vec![full_meal("2", "Pad Thai")]),
    );
    let coordinator = Arc::new(coordinator);

    let cascade = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.search_by_name_cascading("chicken").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let area = coordinator.search_by_area("Thai").await;
    assert!(matches!(
        area,
        SearchOutcome::Found {
            source: SearchSource::Area,
            ..
        }
    ));
    assert_eq!(cascade.await.unwrap(), SearchOutcome::Cancelled);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let published = coordinator.meals().borrow().clone();
    let names: Vec<_> = published.iter().map(Meal::display_name).collect();
    assert_eq!(names, vec!["Pad Thai"]);
}

/// Test a new random fetch supersedes the one in flight
#[tokio::test]
async fn test_random_fetch_cancels_previous() {
    let (_api, coordinator) = coordinator(ScriptedApi {
        slow_random_calls: 2,
        ..Default::default()
    });
    let coordinator = Arc::new(coordinator);

    let slow = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.fetch_random_meals(2).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let fast = coordinator.fetch_random_meals(3).await;
    assert_eq!(fast.meals().len(), 3);
    assert_eq!(slow.await.unwrap(), SearchOutcome::Cancelled);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let ids: Vec<String> = coordinator
        .meals()
        .borrow()
        .iter()
        .filter_map(|meal| meal.id().map(str::to_string))
        .collect();
    assert_eq!(ids, vec!["r3", "r4", "r5"]);
    assert!(!*coordinator.loading().borrow());
}

/// Test the loading flag stays raised while a search is in flight
#[tokio::test]
async fn test_loading_flag_during_search() {
    let (_api, coordinator) = coordinator(
        ScriptedApi::default()
            .name("slow", vec![full_meal("1", "Slow Roast")])
            .delay("slow", Duration::from_millis(100)),
    );
    let coordinator = Arc::new(coordinator);
    let loading = coordinator.loading();

    let search = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.search_by_name_cascading("slow").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(*loading.borrow());

    search.await.unwrap();
    assert!(!*loading.borrow());
}

/// Test random and search families do not cancel each other
#[tokio::test]
async fn test_random_and_search_are_independent() {
    let (_api, coordinator) = coordinator(
        ScriptedApi::default()
            .name("pie", vec![full_meal("1", "Pie")])
            .delay("pie", Duration::from_millis(50)),
    );
    let coordinator = Arc::new(coordinator);

    let search = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.search_by_name_cascading("pie").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let random = coordinator.fetch_random_meals(2).await;

    assert!(matches!(random, SearchOutcome::Found { .. }));
    assert!(matches!(search.await.unwrap(), SearchOutcome::Found { .. }));
}

/// Test random suggestions when every request succeeds
#[tokio::test]
async fn test_random_all_succeed() {
    let (_api, coordinator) = coordinator(ScriptedApi::default());

    let outcome = coordinator.fetch_random_meals(10).await;

    assert_eq!(outcome.meals().len(), 10);
    assert_eq!(coordinator.meals().borrow().len(), 10);
}

/// Test partial random failure is accepted silently
#[tokio::test]
async fn test_random_partial_failure() {
    let (_api, coordinator) = coordinator(ScriptedApi {
        random_fail_every: Some(3),
        ..Default::default()
    });

    let outcome = coordinator.fetch_random_meals(10).await;

    assert_eq!(outcome.meals().len(), 7);
    assert!(coordinator.error().borrow().is_none());
}

/// Test total random failure reports an error and publishes nothing
#[tokio::test]
async fn test_random_total_failure() {
    let (_api, coordinator) = coordinator(ScriptedApi {
        random_always_fails: true,
        ..Default::default()
    });

    let outcome = coordinator.fetch_random_meals(10).await;

    assert_eq!(
        outcome,
        SearchOutcome::Failed {
            message: "Failed to load random meals".to_string()
        }
    );
    assert!(coordinator.meals().borrow().is_empty());
    assert_eq!(
        coordinator.error().borrow().as_deref(),
        Some("Failed to load random meals")
    );
}

/// Test area search keeps partial records whose lookup fails
#[tokio::test]
async fn test_area_enrichment_failure_keeps_partial() {
    let (_api, coordinator) = coordinator(
        ScriptedApi::default()
            .area("Thai", vec![Meal::partial("p1", "Pad Thai"), Meal::partial("p2", "Massaman")])
            .full(full_meal("p2", "Massaman"))
            .failing("p1"),
    );

    let outcome = coordinator.search_by_area("Thai").await;

    let meals = outcome.meals();
    assert_eq!(meals.len(), 2);
    assert!(meals[0].is_partial());
    assert_eq!(meals[1].category.as_deref(), Some("Pasta"));
}

/// Test empty category filter reports a value-specific message
#[tokio::test]
async fn test_category_no_results() {
    let (_api, coordinator) = coordinator(ScriptedApi::default());

    let outcome = coordinator.search_by_category("Nothing").await;

    assert_eq!(
        outcome,
        SearchOutcome::NoResults {
            message: "No results found for category \"Nothing\"".to_string()
        }
    );
}

/// Test lookups by id in all three outcomes
#[tokio::test]
async fn test_fetch_meal_by_id() {
    let (_api, coordinator) = coordinator(
        ScriptedApi::default()
            .full(full_meal("1", "Ravioli"))
            .failing("bad"),
    );

    assert!(matches!(
        coordinator.fetch_meal_by_id("1").await,
        LookupOutcome::Found(meal) if meal.display_name() == "Ravioli"
    ));
    assert_eq!(coordinator.fetch_meal_by_id("2").await, LookupOutcome::NotFound);
    assert!(matches!(
        coordinator.fetch_meal_by_id("bad").await,
        LookupOutcome::Failed(_)
    ));
    assert!(coordinator.error().borrow().is_some());

    coordinator.clear_error();
    assert!(coordinator.error().borrow().is_none());
}

/// Test a successful search clears an earlier error
#[tokio::test]
async fn test_success_clears_error() {
    let (_api, coordinator) = coordinator(
        ScriptedApi::default().name("tacos", vec![full_meal("1", "Tacos")]),
    );

    coordinator.search_by_name_cascading("nothing").await;
    assert!(coordinator.error().borrow().is_some());

    coordinator.search_by_name_cascading("tacos").await;
    assert!(coordinator.error().borrow().is_none());
}

/// Test favorites-first sorting reads the live favorites set
#[tokio::test]
async fn test_apply_sort_favorites_first() {
    let api = Arc::new(ScriptedApi::default().name(
        "mix",
        vec![
            full_meal("a", "A"),
            full_meal("b", "B"),
            full_meal("c", "C"),
        ],
    ));
    let (favorites_tx, favorites_rx) = watch::channel(HashSet::new());
    let coordinator = SearchCoordinator::new(test_config(), api, favorites_rx);

    coordinator.search_by_name_cascading("mix").await;
    favorites_tx.send_replace(["a", "c"].iter().map(|s| s.to_string()).collect());

    let sorted = coordinator.apply_sort(SortKey::FavoritesFirst);
    let names: Vec<_> = sorted.iter().map(Meal::display_name).collect();
    assert_eq!(names, vec!["A", "C", "B"]);
    assert_eq!(coordinator.sort_key(), SortKey::FavoritesFirst);
}

/// Test the chosen sort applies to results published afterwards
#[tokio::test]
async fn test_sort_persists_for_new_results() {
    let (_api, coordinator) = coordinator(ScriptedApi::default().name(
        "cake",
        vec![full_meal("1", "apple cake"), full_meal("2", "Banana cake")],
    ));

    coordinator.apply_sort(SortKey::NameDesc);
    let outcome = coordinator.search_by_name_cascading("cake").await;

    assert_eq!(outcome.meals()[0].display_name(), "Banana cake");
}
