//! Filling in partial records
//!
//! The filter endpoints only return id, name and thumbnail. Records missing a
//! category or area are looked up by id and replaced with the full record;
//! if the lookup fails or finds nothing, the partial record is kept.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::app::client::RecipeApi;
use crate::app::models::Meal;

/// Enrich every partial record in `meals`, preserving input order
///
/// At most `max_concurrent` lookups run at once.
pub async fn enrich_meals(api: &dyn RecipeApi, meals: Vec<Meal>, max_concurrent: usize) -> Vec<Meal> {
    let partial = meals.iter().filter(|meal| meal.is_partial()).count();
    if partial == 0 {
        return meals;
    }
    debug!("Enriching {} of {} records", partial, meals.len());

    stream::iter(meals)
        .map(|meal| enrich_one(api, meal))
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}

async fn enrich_one(api: &dyn RecipeApi, meal: Meal) -> Meal {
    if !meal.is_partial() {
        return meal;
    }
    let Some(id) = meal.id.clone() else {
        return meal;
    };

    match api.lookup_by_id(&id).await {
        Ok(Some(full)) => full,
        Ok(None) => {
            debug!("No full record for meal {}", id);
            meal
        }
        Err(e) => {
            warn!("Lookup for meal {} failed, keeping partial record: {}", id, e);
            meal
        }
    }
}
