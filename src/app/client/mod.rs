//! HTTP client implementation for TheMealDB
//!
//! This module provides the [`RecipeApi`] abstraction the coordinators are
//! written against, and [`MealDbClient`], its HTTP implementation.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Rate-limited GET + JSON decoding

use async_trait::async_trait;
use url::Url;

use crate::app::models::{AreaRecord, CategoriesEnvelope, Category, Meal, MealsEnvelope};
use crate::constants::api;
use crate::errors::{ApiError, ApiResult};

pub mod config;
pub mod http;

#[cfg(test)]
mod tests;

pub use config::ClientConfig;

use http::HttpHandler;

/// Remote recipe operations
///
/// Each call is a single request returning zero or one result set. Empty
/// result sets are `Ok` with an empty vector or `None`, never an error.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// Meals whose name contains `name`
    async fn search_by_name(&self, name: &str) -> ApiResult<Vec<Meal>>;

    /// Full record for one meal
    async fn lookup_by_id(&self, id: &str) -> ApiResult<Option<Meal>>;

    /// One random full record
    async fn random_meal(&self) -> ApiResult<Option<Meal>>;

    /// Partial records for an area / cuisine
    async fn filter_by_area(&self, area: &str) -> ApiResult<Vec<Meal>>;

    /// Partial records for a category
    async fn filter_by_category(&self, category: &str) -> ApiResult<Vec<Meal>>;

    /// All known area names
    async fn list_areas(&self) -> ApiResult<Vec<String>>;

    /// All categories with descriptions
    async fn list_categories(&self) -> ApiResult<Vec<Category>>;
}

/// HTTP client for TheMealDB
#[derive(Debug)]
pub struct MealDbClient {
    http_handler: HttpHandler,
    api_root: Url,
}

impl MealDbClient {
    /// Creates a client with default configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the HTTP client cannot be built
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the base URL is invalid, the rate limit is zero,
    /// or the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        let api_root = config.api_root()?;
        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(client, config.rate_limit_rps)?;

        tracing::info!("Created TheMealDB client for {}", config.base_url);

        Ok(Self {
            http_handler,
            api_root,
        })
    }

    fn endpoint(&self, path: &str, query: Option<(&str, &str)>) -> ApiResult<Url> {
        let mut url = self.api_root.join(path).map_err(|e| ApiError::InvalidUrl {
            url: format!("{}{}", self.api_root, path),
            error: e.to_string(),
        })?;
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    async fn fetch_meals(&self, path: &str, query: Option<(&str, &str)>) -> ApiResult<Vec<Meal>> {
        let url = self.endpoint(path, query)?;
        let envelope: MealsEnvelope<Meal> = self.http_handler.get_json(&url).await?;
        Ok(envelope.meals)
    }
}

#[async_trait]
impl RecipeApi for MealDbClient {
    async fn search_by_name(&self, name: &str) -> ApiResult<Vec<Meal>> {
        self.fetch_meals(api::SEARCH, Some(("s", name))).await
    }

    async fn lookup_by_id(&self, id: &str) -> ApiResult<Option<Meal>> {
        let meals = self.fetch_meals(api::LOOKUP, Some(("i", id))).await?;
        Ok(meals.into_iter().next())
    }

    async fn random_meal(&self) -> ApiResult<Option<Meal>> {
        let meals = self.fetch_meals(api::RANDOM, None).await?;
        Ok(meals.into_iter().next())
    }

    async fn filter_by_area(&self, area: &str) -> ApiResult<Vec<Meal>> {
        self.fetch_meals(api::FILTER, Some(("a", area))).await
    }

    async fn filter_by_category(&self, category: &str) -> ApiResult<Vec<Meal>> {
        self.fetch_meals(api::FILTER, Some(("c", category))).await
    }

    async fn list_areas(&self) -> ApiResult<Vec<String>> {
        let url = self.endpoint(api::LIST, Some(("a", "list")))?;
        let envelope: MealsEnvelope<AreaRecord> = self.http_handler.get_json(&url).await?;
        Ok(envelope
            .meals
            .into_iter()
            .filter_map(|record| record.area)
            .filter(|area| !area.trim().is_empty())
            .collect())
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        let url = self.endpoint(api::CATEGORIES, None)?;
        let envelope: CategoriesEnvelope = self.http_handler.get_json(&url).await?;
        Ok(envelope.categories)
    }
}
