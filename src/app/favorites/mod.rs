//! Favorites coordination
//!
//! [`FavoritesCoordinator`] wraps a [`FavoritesStore`] with toggle semantics
//! and keeps two observable snapshots in sync with the table: the full list
//! (newest first) and the set of favorite identifiers. Every mutation is
//! followed by a reload, so subscribers always see what the store holds.

pub mod store;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::app::models::{FavoriteMeal, Meal};
use crate::errors::StoreResult;

pub use store::{FavoritesStore, SqliteFavoritesStore};

/// Set-membership toggle over the favorites table
pub struct FavoritesCoordinator {
    store: Arc<dyn FavoritesStore>,
    favorites: watch::Sender<Vec<FavoriteMeal>>,
    ids: watch::Sender<HashSet<String>>,
    write_lock: Mutex<()>,
}

impl FavoritesCoordinator {
    /// Create a coordinator and load the current favorites snapshot
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the initial listing fails
    pub async fn new(store: Arc<dyn FavoritesStore>) -> StoreResult<Self> {
        let initial = store.list_recent_first().await?;
        let ids = initial.iter().map(|f| f.id.clone()).collect();
        debug!("Loaded {} favorites", initial.len());

        let (favorites, _) = watch::channel(initial);
        let (ids, _) = watch::channel(ids);

        Ok(Self {
            store,
            favorites,
            ids,
            write_lock: Mutex::new(()),
        })
    }

    /// Favorite `meal`; meals without an identifier are ignored
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write or the reload fails
    pub async fn add(&self, meal: &Meal) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.add_locked(meal).await
    }

    /// Unfavorite by identifier; unknown identifiers are a no-op
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete or the reload fails
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.remove_locked(id).await
    }

    /// Flip membership for `meal`, returning whether it is now a favorite
    ///
    /// A meal without an identifier is never a favorite and nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if any store operation fails
    pub async fn toggle(&self, meal: &Meal) -> StoreResult<bool> {
        let Some(id) = meal.id() else {
            return Ok(false);
        };

        let _guard = self.write_lock.lock().await;
        if self.store.exists(id).await? {
            self.remove_locked(id).await?;
            Ok(false)
        } else {
            self.add_locked(meal).await?;
            Ok(true)
        }
    }

    /// One-shot membership query against the store
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails
    pub async fn is_favorite(&self, id: &str) -> StoreResult<bool> {
        self.store.exists(id).await
    }

    /// Membership of `id` as a stream: the current value first, then every change
    pub fn watch_is_favorite(&self, id: &str) -> BoxStream<'static, bool> {
        let id = id.to_string();
        let receiver = self.ids.subscribe();

        stream::unfold((receiver, None), move |(mut receiver, last)| {
            let id = id.clone();
            async move {
                loop {
                    if last.is_some() && receiver.changed().await.is_err() {
                        return None;
                    }
                    let current = receiver.borrow_and_update().contains(&id);
                    if last != Some(current) {
                        return Some((current, (receiver, Some(current))));
                    }
                }
            }
        })
        .boxed()
    }

    /// Subscription to the full list, newest first
    pub fn all_favorites(&self) -> watch::Receiver<Vec<FavoriteMeal>> {
        self.favorites.subscribe()
    }

    /// Subscription to the set of favorite identifiers
    pub fn favorite_ids(&self) -> watch::Receiver<HashSet<String>> {
        self.ids.subscribe()
    }

    /// Current snapshot without subscribing
    pub fn snapshot(&self) -> Vec<FavoriteMeal> {
        self.favorites.borrow().clone()
    }

    /// Reload both snapshots from the store
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the listing fails
    pub async fn refresh(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.refresh_locked().await
    }

    /// Reload with the write lock already held, so no write can land between
    /// the listing and the publish
    async fn refresh_locked(&self) -> StoreResult<()> {
        let all = self.store.list_recent_first().await?;
        let ids: HashSet<String> = all.iter().map(|f| f.id.clone()).collect();
        self.ids.send_replace(ids);
        self.favorites.send_replace(all);
        Ok(())
    }

    async fn add_locked(&self, meal: &Meal) -> StoreResult<()> {
        let Some(favorite) = FavoriteMeal::from_meal(meal, Utc::now()) else {
            debug!("Ignoring favorite without identifier");
            return Ok(());
        };

        self.store.upsert(&favorite).await?;
        info!("Added favorite {} ({})", favorite.id, favorite.name);
        self.refresh_locked().await
    }

    async fn remove_locked(&self, id: &str) -> StoreResult<()> {
        if self.store.delete(id).await? {
            info!("Removed favorite {}", id);
            self.refresh_locked().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn coordinator() -> FavoritesCoordinator {
        let store = SqliteFavoritesStore::in_memory().await.unwrap();
        FavoritesCoordinator::new(Arc::new(store)).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_then_remove() {
        let favorites = coordinator().await;
        let meal = Meal::partial("52772", "Teriyaki Chicken Casserole").with_category("Chicken");

        favorites.add(&meal).await.unwrap();
        assert!(favorites.is_favorite("52772").await.unwrap());

        let snapshot = favorites.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].category.as_deref(), Some("Chicken"));

        favorites.remove("52772").await.unwrap();
        assert!(!favorites.is_favorite("52772").await.unwrap());
        assert!(favorites.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_is_noop() {
        let favorites = coordinator().await;
        favorites.remove("missing").await.unwrap();
        assert!(favorites.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_pair_restores_membership() {
        let favorites = coordinator().await;
        let meal = Meal::partial("1", "Soup");

        assert!(favorites.toggle(&meal).await.unwrap());
        assert!(!favorites.toggle(&meal).await.unwrap());
        assert!(!favorites.is_favorite("1").await.unwrap());

        favorites.add(&meal).await.unwrap();
        assert!(!favorites.toggle(&meal).await.unwrap());
        assert!(favorites.toggle(&meal).await.unwrap());
        assert!(favorites.is_favorite("1").await.unwrap());
    }

    #[tokio::test]
    async fn test_meal_without_id_is_ignored() {
        let favorites = coordinator().await;
        let mut meal = Meal::partial("x", "Nameless");
        meal.id = None;

        favorites.add(&meal).await.unwrap();
        assert!(!favorites.toggle(&meal).await.unwrap());
        assert!(favorites.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_subscriptions_follow_mutations() {
        let favorites = coordinator().await;
        let mut all = favorites.all_favorites();
        let ids = favorites.favorite_ids();

        favorites.add(&Meal::partial("1", "First")).await.unwrap();
        favorites.add(&Meal::partial("2", "Second")).await.unwrap();

        assert!(all.has_changed().unwrap());
        let names: Vec<_> = all.borrow_and_update().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["Second", "First"]);
        assert!(ids.borrow().contains("1"));
    }

    #[tokio::test]
    async fn test_watch_is_favorite_emits_changes() {
        let favorites = coordinator().await;
        let meal = Meal::partial("9", "Stew");
        let mut membership = favorites.watch_is_favorite("9");

        let first = timeout(Duration::from_secs(1), membership.next()).await.unwrap();
        assert_eq!(first, Some(false));

        favorites.add(&meal).await.unwrap();
        let second = timeout(Duration::from_secs(1), membership.next()).await.unwrap();
        assert_eq!(second, Some(true));

        favorites.remove("9").await.unwrap();
        let third = timeout(Duration::from_secs(1), membership.next()).await.unwrap();
        assert_eq!(third, Some(false));
    }

    /// Store whose second listing returns its rows only after a delay
    struct SlowListingStore {
        inner: SqliteFavoritesStore,
        listings: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl FavoritesStore for SlowListingStore {
        async fn upsert(&self, favorite: &FavoriteMeal) -> StoreResult<()> {
            self.inner.upsert(favorite).await
        }

        async fn delete(&self, id: &str) -> StoreResult<bool> {
            self.inner.delete(id).await
        }

        async fn exists(&self, id: &str) -> StoreResult<bool> {
            self.inner.exists(id).await
        }

        async fn list_recent_first(&self) -> StoreResult<Vec<FavoriteMeal>> {
            let rows = self.inner.list_recent_first().await?;
            let n = self
                .listings
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
                + 1;
            if n == 2 {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Ok(rows)
        }
    }

    #[tokio::test]
    async fn test_refresh_never_publishes_stale_listing() {
        let store = SlowListingStore {
            inner: SqliteFavoritesStore::in_memory().await.unwrap(),
            listings: std::sync::atomic::AtomicUsize::new(0),
        };
        let favorites = Arc::new(FavoritesCoordinator::new(Arc::new(store)).await.unwrap());

        let refresh = {
            let favorites = favorites.clone();
            tokio::spawn(async move { favorites.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        favorites.add(&Meal::partial("1", "Soup")).await.unwrap();
        refresh.await.unwrap().unwrap();

        assert!(favorites.is_favorite("1").await.unwrap());
        assert!(favorites.favorite_ids().borrow().contains("1"));
        assert_eq!(favorites.snapshot().len(), 1);
    }
}
