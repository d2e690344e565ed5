use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{PlantStore, StoreError, StoreResult, LOCATION, PLANT_TYPE};
use crate::models::care_event::CareEvent;
use crate::models::location::{Location, NewLocation};
use crate::models::plant::{NewPlant, Plant, PlantDetails};
use crate::models::plant_type::{NewPlantType, PlantType};
use crate::services::watering;

const PLANT_DETAILS_SELECT: &str = r#"
    SELECT p.*,
           pt.name AS plant_type_name,
           pt.default_image_base64 AS plant_type_default_image,
           l.name AS location_name
    FROM plants p
    JOIN plant_types pt ON pt.id = p.plant_type_id
    JOIN locations l ON l.id = p.location_id
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn plant_exists(&self, id: Uuid) -> StoreResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM plants WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn fetch_details(&self, id: Uuid) -> StoreResult<Option<PlantDetails>> {
        let sql = format!("{PLANT_DETAILS_SELECT} WHERE p.id = $1");
        let details = sqlx::query_as::<_, PlantDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(details)
    }
}

/// Unique-index violations on the lower-cased name columns surface as
/// `DuplicateName`, covering inserts that race past the pre-check.
fn duplicate_or(err: sqlx::Error, kind: &'static str, name: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateName {
            kind,
            name: name.to_string(),
        },
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl PlantStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_plants(&self) -> StoreResult<Vec<PlantDetails>> {
        let sql = format!("{PLANT_DETAILS_SELECT} ORDER BY p.created_at ASC, p.id ASC");
        let plants = sqlx::query_as::<_, PlantDetails>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(plants)
    }

    async fn get_plant(&self, id: Uuid) -> StoreResult<Option<PlantDetails>> {
        self.fetch_details(id).await
    }

    async fn insert_plant(&self, plant: NewPlant, now: DateTime<Utc>) -> StoreResult<PlantDetails> {
        let type_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM plant_types WHERE id = $1)",
        )
        .bind(plant.plant_type_id)
        .fetch_one(&self.pool)
        .await?;
        if !type_exists {
            return Err(StoreError::UnknownReference {
                kind: PLANT_TYPE,
                id: plant.plant_type_id,
            });
        }

        let location_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
                .bind(plant.location_id)
                .fetch_one(&self.pool)
                .await?;
        if !location_exists {
            return Err(StoreError::UnknownReference {
                kind: LOCATION,
                id: plant.location_id,
            });
        }

        let plant = plant.into_plant(now);
        sqlx::query(
            r#"
            INSERT INTO plants (id, name, plant_type_id, location_id, watering_frequency_days, last_watered_date, image_base64, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(plant.id)
        .bind(&plant.name)
        .bind(plant.plant_type_id)
        .bind(plant.location_id)
        .bind(plant.watering_frequency_days)
        .bind(plant.last_watered_date)
        .bind(&plant.image_base64)
        .bind(plant.created_at)
        .execute(&self.pool)
        .await?;

        self.fetch_details(plant.id)
            .await?
            .ok_or(StoreError::PlantNotFound(plant.id))
    }

    async fn record_watering(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<(Plant, CareEvent)> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent waterings of the same plant.
        let plant = sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::PlantNotFound(id))?;

        let (watered, event) = watering::record_watering(&plant, now)?;

        let watered = sqlx::query_as::<_, Plant>(
            "UPDATE plants SET last_watered_date = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(watered.last_watered_date)
        .fetch_one(&mut *tx)
        .await?;

        let event = sqlx::query_as::<_, CareEvent>(
            r#"
            INSERT INTO plant_care_history (id, plant_id, care_type, care_date, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(event.plant_id)
        .bind(&event.care_type)
        .bind(event.care_date)
        .bind(&event.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((watered, event))
    }

    async fn list_plant_types(&self) -> StoreResult<Vec<PlantType>> {
        let plant_types = sqlx::query_as::<_, PlantType>(
            "SELECT * FROM plant_types ORDER BY created_at ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(plant_types)
    }

    async fn insert_plant_type(
        &self,
        plant_type: NewPlantType,
        now: DateTime<Utc>,
    ) -> StoreResult<PlantType> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM plant_types WHERE LOWER(name) = LOWER($1))",
        )
        .bind(&plant_type.name)
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(StoreError::DuplicateName {
                kind: PLANT_TYPE,
                name: plant_type.name,
            });
        }

        let plant_type = plant_type.into_plant_type(now);
        sqlx::query_as::<_, PlantType>(
            r#"
            INSERT INTO plant_types (id, name, description, default_image_base64, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(plant_type.id)
        .bind(&plant_type.name)
        .bind(&plant_type.description)
        .bind(&plant_type.default_image_base64)
        .bind(plant_type.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_or(e, PLANT_TYPE, &plant_type.name))
    }

    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        let locations =
            sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY created_at ASC, name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(locations)
    }

    async fn insert_location(&self, location: NewLocation, now: DateTime<Utc>) -> StoreResult<Location> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE LOWER(name) = LOWER($1))",
        )
        .bind(&location.name)
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(StoreError::DuplicateName {
                kind: LOCATION,
                name: location.name,
            });
        }

        let location = location.into_location(now);
        sqlx::query_as::<_, Location>(
            "INSERT INTO locations (id, name, created_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(location.id)
        .bind(&location.name)
        .bind(location.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_or(e, LOCATION, &location.name))
    }

    async fn list_care_events(&self, plant_id: Uuid) -> StoreResult<Vec<CareEvent>> {
        if !self.plant_exists(plant_id).await? {
            return Err(StoreError::PlantNotFound(plant_id));
        }

        let events = sqlx::query_as::<_, CareEvent>(
            r#"
            SELECT * FROM plant_care_history
            WHERE plant_id = $1
            ORDER BY care_date DESC
            "#,
        )
        .bind(plant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn append_care_event(&self, event: CareEvent) -> StoreResult<CareEvent> {
        if !self.plant_exists(event.plant_id).await? {
            return Err(StoreError::PlantNotFound(event.plant_id));
        }

        let event = sqlx::query_as::<_, CareEvent>(
            r#"
            INSERT INTO plant_care_history (id, plant_id, care_type, care_date, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(event.plant_id)
        .bind(&event.care_type)
        .bind(event.care_date)
        .bind(&event.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    async fn count_care_events(
        &self,
        care_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM plant_care_history
            WHERE care_type = $1 AND care_date >= $2 AND care_date < $3
            "#,
        )
        .bind(care_type)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
