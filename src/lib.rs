//! Plant care API: plants, plant types, locations and care history over
//! HTTP, with watering status computed on every read.
//!
//! The binary in `main.rs` wires configuration, storage and the router
//! together; integration tests build the same router over the in-memory
//! store.

use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod image;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use cache::ListCache;
use config::Config;
use models::plant::PlantDetails;
use store::PlantStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlantStore>,
    pub config: Arc<Config>,
    /// Plant list shared by the list, due, urgency and grouping endpoints.
    /// Invalidated whenever a plant is added or watered.
    pub plants_cache: ListCache<PlantDetails>,
}

impl AppState {
    pub fn new(store: Arc<dyn PlantStore>, config: Arc<Config>) -> Self {
        let plants_cache = ListCache::new(config.plants_cache_ttl());
        Self {
            store,
            config,
            plants_cache,
        }
    }
}
