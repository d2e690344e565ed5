//! Persistence for plants, their plant types and locations, and the
//! append-only care history.
//!
//! Two implementations share the [`PlantStore`] trait: Postgres for real
//! deployments and an in-memory store used when no database is configured
//! (and by the integration tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::care_event::CareEvent;
use crate::models::location::{Location, NewLocation};
use crate::models::plant::{NewPlant, Plant, PlantDetails};
use crate::models::plant_type::{NewPlantType, PlantType};
use crate::services::watering::InvalidScheduleError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const PLANT_TYPE: &str = "plant type";
pub const LOCATION: &str = "location";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Plant not found: {0}")]
    PlantNotFound(Uuid),

    #[error("Unknown {kind}: {id}")]
    UnknownReference { kind: &'static str, id: Uuid },

    #[error("A {kind} named '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error(transparent)]
    InvalidSchedule(#[from] InvalidScheduleError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PlantStore: Send + Sync {
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;

    /// All plants, oldest first.
    async fn list_plants(&self) -> StoreResult<Vec<PlantDetails>>;

    async fn get_plant(&self, id: Uuid) -> StoreResult<Option<PlantDetails>>;

    /// Fails with `UnknownReference` if the plant type or location is missing.
    async fn insert_plant(&self, plant: NewPlant, now: DateTime<Utc>) -> StoreResult<PlantDetails>;

    /// Atomically sets the plant's last-watered date to `now` and appends the
    /// matching care event.
    async fn record_watering(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<(Plant, CareEvent)>;

    async fn list_plant_types(&self) -> StoreResult<Vec<PlantType>>;

    /// Names are unique ignoring case.
    async fn insert_plant_type(
        &self,
        plant_type: NewPlantType,
        now: DateTime<Utc>,
    ) -> StoreResult<PlantType>;

    async fn list_locations(&self) -> StoreResult<Vec<Location>>;

    /// Names are unique ignoring case.
    async fn insert_location(&self, location: NewLocation, now: DateTime<Utc>) -> StoreResult<Location>;

    /// Newest first. Fails with `PlantNotFound` for an unknown plant.
    async fn list_care_events(&self, plant_id: Uuid) -> StoreResult<Vec<CareEvent>>;

    async fn append_care_event(&self, event: CareEvent) -> StoreResult<CareEvent>;

    /// Events of `care_type` with `start <= care_date < end`.
    async fn count_care_events(
        &self,
        care_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<i64>;
}
