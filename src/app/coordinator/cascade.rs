//! Ordered fallback over search producers
//!
//! A cascade is a list of [`CascadeStep`]s evaluated lazily in order; the
//! first step yielding a non-empty list wins and later steps never run.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;

use crate::app::client::RecipeApi;
use crate::app::coordinator::enrichment::enrich_meals;
use crate::app::models::Meal;
use crate::errors::ApiResult;

/// Which endpoint produced a result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchSource {
    Name,
    Area,
    Category,
    Random,
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SearchSource::Name => "name",
            SearchSource::Area => "area",
            SearchSource::Category => "category",
            SearchSource::Random => "random",
        };
        f.write_str(label)
    }
}

type Producer = Box<dyn FnOnce() -> BoxFuture<'static, ApiResult<Vec<Meal>>> + Send>;

/// One candidate search, not started until the cascade reaches it
pub struct CascadeStep {
    source: SearchSource,
    produce: Producer,
}

impl CascadeStep {
    /// Wrap a producer; `produce` is only called if every earlier step was empty
    pub fn new<F>(source: SearchSource, produce: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, ApiResult<Vec<Meal>>> + Send + 'static,
    {
        Self {
            source,
            produce: Box::new(produce),
        }
    }

    /// Endpoint this step queries
    pub fn source(&self) -> SearchSource {
        self.source
    }
}

/// The winning step of a cascade
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeHit {
    pub source: SearchSource,
    pub meals: Vec<Meal>,
}

/// Run `steps` in order and return the first non-empty result
///
/// Returns `Ok(None)` when every step is empty. An error from any step ends
/// the cascade; later steps are not attempted.
pub async fn first_non_empty(steps: Vec<CascadeStep>) -> ApiResult<Option<CascadeHit>> {
    for step in steps {
        let meals = (step.produce)().await?;
        if !meals.is_empty() {
            tracing::debug!("Cascade matched on {} ({} results)", step.source, meals.len());
            return Ok(Some(CascadeHit {
                source: step.source,
                meals,
            }));
        }
        tracing::debug!("Cascade step {} returned nothing", step.source);
    }
    Ok(None)
}

/// The name → area → category cascade for `query`
///
/// Area and category hits come from filter endpoints and are enriched.
pub fn name_area_category(
    api: Arc<dyn RecipeApi>,
    query: String,
    max_concurrent: usize,
) -> Vec<CascadeStep> {
    let by_name = {
        let api = api.clone();
        let query = query.clone();
        CascadeStep::new(SearchSource::Name, move || {
            async move { api.search_by_name(&query).await }.boxed()
        })
    };

    let by_area = {
        let api = api.clone();
        let query = query.clone();
        CascadeStep::new(SearchSource::Area, move || {
            async move {
                let meals = api.filter_by_area(&query).await?;
                Ok(enrich_meals(api.as_ref(), meals, max_concurrent).await)
            }
            .boxed()
        })
    };

    let by_category = CascadeStep::new(SearchSource::Category, move || {
        async move {
            let meals = api.filter_by_category(&query).await?;
            Ok(enrich_meals(api.as_ref(), meals, max_concurrent).await)
        }
        .boxed()
    });

    vec![by_name, by_area, by_category]
}
