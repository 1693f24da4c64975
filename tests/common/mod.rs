//! Shared fixtures for integration tests
//!
//! A wiremock server standing in for TheMealDB plus helpers for the JSON
//! shapes it returns.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use meal_finder::app::{ClientConfig, MealDbClient, SearchConfig};

/// Full meal object as returned by search, lookup and random
pub fn meal_json(id: &str, name: &str, category: &str, area: &str) -> Value {
    json!({
        "idMeal": id,
        "strMeal": name,
        "strMealThumb": format!("https://img.example/{id}.jpg"),
        "strCategory": category,
        "strArea": area,
        "strInstructions": "Cook it.",
        "strTags": "Dinner,Quick",
        "strIngredient1": "Rice",
        "strMeasure1": "1 cup",
        "strIngredient2": "",
        "strMeasure2": " "
    })
}

/// Partial meal object as returned by the filter endpoints
pub fn partial_json(id: &str, name: &str) -> Value {
    json!({
        "idMeal": id,
        "strMeal": name,
        "strMealThumb": format!("https://img.example/{id}.jpg")
    })
}

/// Respond to `GET /1/<endpoint>?<key>=<value>` with `{"meals": meals}`
pub async fn mount_meals(server: &MockServer, endpoint: &str, key: &str, value: &str, meals: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/1/{endpoint}")))
        .and(query_param(key, value))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meals": meals })))
        .mount(server)
        .await;
}

/// API client pointed at `server` with a rate limit that does not slow tests
pub fn client_for(server: &MockServer) -> Arc<MealDbClient> {
    let mut config = ClientConfig::default().with_base_url(server.uri());
    config.rate_limit_rps = 1000;
    Arc::new(MealDbClient::with_config(config).expect("client should build"))
}

/// Search settings with a short debounce window
pub fn search_config() -> SearchConfig {
    SearchConfig::default()
        .with_debounce_window(Duration::from_millis(50))
        .with_random_count(5)
}
