use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub plant_type_id: Uuid,
    pub location_id: Uuid,
    pub watering_frequency_days: i32,
    /// `None` until the first recorded watering.
    pub last_watered_date: Option<DateTime<Utc>>,
    pub image_base64: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A plant joined with the names and default image of what it references.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PlantDetails {
    #[sqlx(flatten)]
    pub plant: Plant,
    pub plant_type_name: String,
    pub plant_type_default_image: Option<String>,
    pub location_name: String,
}

impl PlantDetails {
    /// The plant's own image, falling back to its type's default.
    pub fn display_image(&self) -> Option<&str> {
        self.plant
            .image_base64
            .as_deref()
            .filter(|img| !img.is_empty())
            .or(self.plant_type_default_image.as_deref())
    }
}

/// A validated plant ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlant {
    pub name: String,
    pub plant_type_id: Uuid,
    pub location_id: Uuid,
    pub watering_frequency_days: i32,
    pub last_watered_date: Option<DateTime<Utc>>,
    pub image_base64: Option<String>,
}

impl NewPlant {
    pub fn into_plant(self, now: DateTime<Utc>) -> Plant {
        Plant {
            id: Uuid::new_v4(),
            name: self.name,
            plant_type_id: self.plant_type_id,
            location_id: self.location_id,
            watering_frequency_days: self.watering_frequency_days,
            last_watered_date: self.last_watered_date,
            image_base64: self.image_base64,
            created_at: now,
        }
    }
}
