//! Observable coordinator state
//!
//! Each observable is a `tokio::sync::watch` channel: subscribers see the last
//! published value immediately and every later change. Only the coordinator
//! writes; everything else gets receivers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::app::coordinator::sorting::{sort_meals, SortKey};
use crate::app::models::Meal;

/// State published by the search coordinator
#[derive(Debug)]
pub struct SearchState {
    meals: watch::Sender<Vec<Meal>>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
    sort_key: watch::Sender<SortKey>,
    /// Last results in API order, kept so insertion order can be restored
    unsorted: Mutex<Vec<Meal>>,
    in_flight: AtomicUsize,
}

impl SearchState {
    /// Empty state with `sort_key` as the initial ordering
    pub fn new(sort_key: SortKey) -> Self {
        Self {
            meals: watch::channel(Vec::new()).0,
            loading: watch::channel(false).0,
            error: watch::channel(None).0,
            sort_key: watch::channel(sort_key).0,
            unsorted: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Replace the result list and publish it sorted by the current key
    pub fn publish_results(&self, meals: Vec<Meal>, favorites: &HashSet<String>) -> Vec<Meal> {
        let mut unsorted = self.lock_unsorted();
        let sorted = sort_meals(&meals, *self.sort_key.borrow(), favorites);
        *unsorted = meals;
        self.meals.send_replace(sorted.clone());
        sorted
    }

    /// Change the sort key and republish the current results under it
    pub fn resort(&self, key: SortKey, favorites: &HashSet<String>) -> Vec<Meal> {
        let unsorted = self.lock_unsorted();
        self.sort_key.send_replace(key);
        let sorted = sort_meals(&unsorted, key, favorites);
        self.meals.send_replace(sorted.clone());
        sorted
    }

    /// Publish an error message
    pub fn set_error(&self, message: impl Into<String>) {
        self.error.send_replace(Some(message.into()));
    }

    /// Reset the error observable
    pub fn clear_error(&self) {
        self.error.send_replace(None);
    }

    /// Mark one more operation as running; loading stays true until every
    /// guard handed out is dropped
    pub fn start_loading(self: &Arc<Self>) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.loading.send_replace(true);
        LoadingGuard {
            state: Arc::clone(self),
        }
    }

    /// Current sort key
    pub fn sort_key(&self) -> SortKey {
        *self.sort_key.borrow()
    }

    /// Subscribe to the published result list
    pub fn subscribe_meals(&self) -> watch::Receiver<Vec<Meal>> {
        self.meals.subscribe()
    }

    /// Subscribe to the loading flag
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Subscribe to the last error message
    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    fn lock_unsorted(&self) -> std::sync::MutexGuard<'_, Vec<Meal>> {
        self.unsorted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps the loading flag raised while alive
///
/// Dropped both when an operation completes and when its task is aborted.
#[derive(Debug)]
pub struct LoadingGuard {
    state: Arc<SearchState>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let remaining = self.state.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 {
            self.state.loading.send_replace(false);
        }
    }
}
