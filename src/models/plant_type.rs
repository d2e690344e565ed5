use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlantType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub default_image_base64: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlantType {
    pub name: String,
    pub description: String,
    pub default_image_base64: Option<String>,
}

impl NewPlantType {
    pub fn into_plant_type(self, now: DateTime<Utc>) -> PlantType {
        PlantType {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            default_image_base64: self.default_image_base64,
            created_at: now,
        }
    }
}
