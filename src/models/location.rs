use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub name: String,
}

impl NewLocation {
    pub fn into_location(self, now: DateTime<Utc>) -> Location {
        Location {
            id: Uuid::new_v4(),
            name: self.name,
            created_at: now,
        }
    }
}
