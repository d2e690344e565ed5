use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes());

    let plant_routes = Router::new()
        .route(
            "/api/plants",
            get(handlers::plants::list_plants).post(handlers::plants::create_plant),
        )
        .route("/api/plants/due", get(handlers::plants::list_due_plants))
        .route(
            "/api/plants/by-urgency",
            get(handlers::plants::list_plants_by_urgency),
        )
        .route(
            "/api/plants/group-by-location",
            get(handlers::plants::group_plants_by_location),
        )
        .route("/api/plants/:id", get(handlers::plants::get_plant))
        .route("/api/plants/:id/status", get(handlers::plants::get_plant_status))
        .route("/api/plants/:id/image", get(handlers::plants::get_plant_image))
        .route("/api/plants/:id/water", put(handlers::plants::water_plant));

    let catalog_routes = Router::new()
        .route(
            "/api/plant-types",
            get(handlers::plant_types::list_plant_types)
                .post(handlers::plant_types::create_plant_type),
        )
        .route(
            "/api/locations",
            get(handlers::locations::list_locations).post(handlers::locations::create_location),
        );

    let history_routes = Router::new()
        .route(
            "/api/care-history",
            post(handlers::care_history::create_care_event),
        )
        .route(
            "/api/care-history/stats/watered-this-week",
            get(handlers::care_history::watered_this_week),
        )
        .route(
            "/api/care-history/:plant_id",
            get(handlers::care_history::list_care_history),
        );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(plant_routes)
        .merge(catalog_routes)
        .merge(history_routes)
        .layer(body_limit)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
