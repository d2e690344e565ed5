#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use plantcare_api::config::Config;
use plantcare_api::routes;
use plantcare_api::services::seed;
use plantcare_api::store::{MemoryStore, PlantStore};
use plantcare_api::AppState;

/// Config for tests: in-memory store, no seeding from disk, and a zero TTL
/// so every list request reads the store.
pub fn test_config() -> Config {
    Config {
        plants_cache_ttl_secs: 0,
        max_image_bytes: 1024,
        ..Config::default()
    }
}

/// Full router over a fresh in-memory store seeded with the default plant
/// types and locations, mirroring what `main.rs` builds without a database.
pub async fn build_test_app() -> Router {
    build_test_app_with(test_config()).await
}

pub async fn build_test_app_with(config: Config) -> Router {
    let store: Arc<dyn PlantStore> = Arc::new(MemoryStore::new());
    seed::seed_defaults(store.as_ref(), None, Utc::now())
        .await
        .unwrap();

    routes::app(AppState::new(store, Arc::new(config)))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    send(app, Method::POST, uri, Body::from(body.to_string())).await
}

pub async fn put(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Body::empty()).await
}

pub async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Id of the seeded entry named `name` in `/api/plant-types` or
/// `/api/locations`.
pub async fn seeded_id(app: &Router, uri: &str, name: &str) -> String {
    let json = body_json(get(app.clone(), uri).await).await;
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["name"] == name)
        .unwrap_or_else(|| panic!("{name} not seeded at {uri}"))["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Creates a plant with the given schedule and returns its JSON.
pub async fn create_plant(
    app: &Router,
    name: &str,
    location: &str,
    frequency_days: i32,
    last_watered: Option<chrono::DateTime<Utc>>,
) -> Value {
    let plant_type_id = seeded_id(app, "/api/plant-types", "Tropical").await;
    let location_id = seeded_id(app, "/api/locations", location).await;

    let mut body = serde_json::json!({
        "name": name,
        "plantTypeId": plant_type_id,
        "locationId": location_id,
        "wateringFrequencyDays": frequency_days,
    });
    if let Some(date) = last_watered {
        body["lastWateredDate"] = serde_json::json!(date);
    }

    let response = post_json(app.clone(), "/api/plants", &body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
