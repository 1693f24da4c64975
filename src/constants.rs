//! Application constants for Meal Finder
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Environment variable overriding the TheMealDB API key
    pub const API_KEY: &str = "MEAL_FINDER_API_KEY";
}

/// TheMealDB service URLs and endpoints
pub mod api {
    /// API base URL, without the key segment
    pub const BASE_URL: &str = "https://www.themealdb.com/api/json/v1";

    /// Public test key accepted by TheMealDB
    pub const DEFAULT_API_KEY: &str = "1";

    /// Search meals by name (`s=<name>`)
    pub const SEARCH: &str = "search.php";

    /// Lookup full meal details by id (`i=<id>`)
    pub const LOOKUP: &str = "lookup.php";

    /// Single random meal
    pub const RANDOM: &str = "random.php";

    /// Filter by area (`a=`) or category (`c=`)
    pub const FILTER: &str = "filter.php";

    /// List areas (`a=list`) or category names (`c=list`)
    pub const LIST: &str = "list.php";

    /// Full category listing with thumbnails and descriptions
    pub const CATEGORIES: &str = "categories.php";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("Meal-Finder/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Rate limiting
pub mod limits {
    /// Default client-side rate limit (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 10;
}

/// Search coordination defaults
pub mod search {
    use super::Duration;

    /// Identical queries re-submitted within this window are ignored
    pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

    /// Maximum concurrent lookups while enriching filter results
    pub const ENRICHMENT_CONCURRENCY: usize = 4;

    /// Number of random meals fetched when none is specified
    pub const DEFAULT_RANDOM_COUNT: usize = 10;

    /// Ingredient/measure slots in a TheMealDB record
    pub const MAX_INGREDIENTS: usize = 20;

    /// Message published when every random request failed
    pub const RANDOM_FAILED_MESSAGE: &str = "Failed to load random meals";
}

/// Favorites persistence
pub mod favorites {
    /// Name stored for meals that arrive without one
    pub const UNKNOWN_MEAL_NAME: &str = "Unknown Meal";

    /// Database file name inside the data directory
    pub const DATABASE_FILE: &str = "favorites.db";

    /// Application directory name under the platform config/data dirs
    pub const APP_DIR: &str = "meal-finder";

    /// Maximum pooled connections for file-backed databases
    pub const MAX_CONNECTIONS: u32 = 4;
}
