use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const WATERING_CARE_TYPE: &str = "Watering";

/// One entry of a plant's care history. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CareEvent {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub care_type: String,
    pub care_date: DateTime<Utc>,
    pub notes: String,
}

impl CareEvent {
    pub fn new(
        plant_id: Uuid,
        care_type: impl Into<String>,
        notes: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            plant_id,
            care_type: care_type.into(),
            care_date: now,
            notes: notes.into(),
        }
    }
}
