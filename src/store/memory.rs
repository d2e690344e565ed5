use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PlantStore, StoreError, StoreResult, LOCATION, PLANT_TYPE};
use crate::models::care_event::CareEvent;
use crate::models::location::{Location, NewLocation};
use crate::models::plant::{NewPlant, Plant, PlantDetails};
use crate::models::plant_type::{NewPlantType, PlantType};
use crate::services::watering;

/// Process-local store. Every operation takes the single lock, so a watering
/// update and its history append are never observed half done.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    plant_types: Vec<PlantType>,
    locations: Vec<Location>,
    plants: Vec<Plant>,
    care_events: Vec<CareEvent>,
}

impl Tables {
    fn details(&self, plant: &Plant) -> StoreResult<PlantDetails> {
        let plant_type = self
            .plant_types
            .iter()
            .find(|t| t.id == plant.plant_type_id)
            .ok_or(StoreError::UnknownReference {
                kind: PLANT_TYPE,
                id: plant.plant_type_id,
            })?;
        let location = self
            .locations
            .iter()
            .find(|l| l.id == plant.location_id)
            .ok_or(StoreError::UnknownReference {
                kind: LOCATION,
                id: plant.location_id,
            })?;

        Ok(PlantDetails {
            plant: plant.clone(),
            plant_type_name: plant_type.name.clone(),
            plant_type_default_image: plant_type.default_image_base64.clone(),
            location_name: location.name.clone(),
        })
    }

    fn has_plant(&self, id: Uuid) -> bool {
        self.plants.iter().any(|p| p.id == id)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlantStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_plants(&self) -> StoreResult<Vec<PlantDetails>> {
        let tables = self.tables.read().await;
        tables.plants.iter().map(|p| tables.details(p)).collect()
    }

    async fn get_plant(&self, id: Uuid) -> StoreResult<Option<PlantDetails>> {
        let tables = self.tables.read().await;
        tables
            .plants
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.details(p))
            .transpose()
    }

    async fn insert_plant(&self, plant: NewPlant, now: DateTime<Utc>) -> StoreResult<PlantDetails> {
        let mut tables = self.tables.write().await;

        if !tables.plant_types.iter().any(|t| t.id == plant.plant_type_id) {
            return Err(StoreError::UnknownReference {
                kind: PLANT_TYPE,
                id: plant.plant_type_id,
            });
        }
        if !tables.locations.iter().any(|l| l.id == plant.location_id) {
            return Err(StoreError::UnknownReference {
                kind: LOCATION,
                id: plant.location_id,
            });
        }

        let plant = plant.into_plant(now);
        let details = tables.details(&plant)?;
        tables.plants.push(plant);
        Ok(details)
    }

    async fn record_watering(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<(Plant, CareEvent)> {
        let mut tables = self.tables.write().await;

        let slot = tables
            .plants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::PlantNotFound(id))?;

        let (watered, event) = watering::record_watering(slot, now)?;
        *slot = watered.clone();
        tables.care_events.push(event.clone());

        Ok((watered, event))
    }

    async fn list_plant_types(&self) -> StoreResult<Vec<PlantType>> {
        Ok(self.tables.read().await.plant_types.clone())
    }

    async fn insert_plant_type(
        &self,
        plant_type: NewPlantType,
        now: DateTime<Utc>,
    ) -> StoreResult<PlantType> {
        let mut tables = self.tables.write().await;
        if tables
            .plant_types
            .iter()
            .any(|t| same_name(&t.name, &plant_type.name))
        {
            return Err(StoreError::DuplicateName {
                kind: PLANT_TYPE,
                name: plant_type.name,
            });
        }

        let plant_type = plant_type.into_plant_type(now);
        tables.plant_types.push(plant_type.clone());
        Ok(plant_type)
    }

    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        Ok(self.tables.read().await.locations.clone())
    }

    async fn insert_location(&self, location: NewLocation, now: DateTime<Utc>) -> StoreResult<Location> {
        let mut tables = self.tables.write().await;
        if tables
            .locations
            .iter()
            .any(|l| same_name(&l.name, &location.name))
        {
            return Err(StoreError::DuplicateName {
                kind: LOCATION,
                name: location.name,
            });
        }

        let location = location.into_location(now);
        tables.locations.push(location.clone());
        Ok(location)
    }

    async fn list_care_events(&self, plant_id: Uuid) -> StoreResult<Vec<CareEvent>> {
        let tables = self.tables.read().await;
        if !tables.has_plant(plant_id) {
            return Err(StoreError::PlantNotFound(plant_id));
        }

        let mut events: Vec<CareEvent> = tables
            .care_events
            .iter()
            .rev()
            .filter(|e| e.plant_id == plant_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.care_date.cmp(&a.care_date));
        Ok(events)
    }

    async fn append_care_event(&self, event: CareEvent) -> StoreResult<CareEvent> {
        let mut tables = self.tables.write().await;
        if !tables.has_plant(event.plant_id) {
            return Err(StoreError::PlantNotFound(event.plant_id));
        }
        tables.care_events.push(event.clone());
        Ok(event)
    }

    async fn count_care_events(
        &self,
        care_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .care_events
            .iter()
            .filter(|e| e.care_type == care_type && e.care_date >= start && e.care_date < end)
            .count();
        Ok(count as i64)
    }
}
