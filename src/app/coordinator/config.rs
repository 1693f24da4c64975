//! Configuration structures for the search coordinator

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::coordinator::sorting::SortKey;
use crate::constants::search;

/// Configuration for the search coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Identical queries re-submitted within this window are ignored
    pub debounce_window: Duration,
    /// Upper bound on concurrent requests for enrichment and random fan-out
    pub max_concurrent_requests: usize,
    /// Number of random meals fetched by default
    pub random_count: usize,
    /// Sort applied to published results until changed
    pub default_sort: SortKey,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_window: search::DEBOUNCE_WINDOW,
            max_concurrent_requests: search::ENRICHMENT_CONCURRENCY,
            random_count: search::DEFAULT_RANDOM_COUNT,
            default_sort: SortKey::Insertion,
        }
    }
}

impl SearchConfig {
    /// Set the debounce window
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Set the request fan-out bound
    pub fn with_max_concurrent_requests(mut self, count: usize) -> Self {
        self.max_concurrent_requests = count;
        self
    }

    /// Set the default number of random meals
    pub fn with_random_count(mut self, count: usize) -> Self {
        self.random_count = count;
        self
    }

    /// Set the initial sort
    pub fn with_default_sort(mut self, sort: SortKey) -> Self {
        self.default_sort = sort;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_requests == 0 {
            return Err("Maximum concurrent requests cannot be zero".to_string());
        }

        if self.random_count == 0 {
            return Err("Random meal count cannot be zero".to_string());
        }

        Ok(())
    }
}
