//! # Plant Care — Request/Response DTOs
//!
//! All API contract types in one module, plus the explicit conversions
//! between them and the internal records.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Response` → serialized to client JSON, always inside [`ResponseDto`]
//! - Field names are camelCase on the wire
//! - Requests become internal `New*` records only through the
//!   `into_new_*` methods, which validate first

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::image;
use crate::models::care_event::{CareEvent, WATERING_CARE_TYPE};
use crate::models::location::{Location, NewLocation};
use crate::models::plant::{NewPlant, Plant, PlantDetails};
use crate::models::plant_type::{NewPlantType, PlantType};
use crate::services::stats::WeekBounds;
use crate::services::watering::{HasSchedule, InvalidScheduleError, WateringStatus};

// ============================================================================
// Common
// ============================================================================

/// Envelope wrapping every response body, success or failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDto<T> {
    pub data: Option<T>,
    pub has_errors: bool,
    pub errors: Vec<String>,
}

impl<T> ResponseDto<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            has_errors: false,
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            data: None,
            has_errors: true,
            errors,
        }
    }
}

/// Trims and capitalises a plant type or location name: "  living ROOM"
/// becomes "Living room".
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

fn non_blank(value: &str, message: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(message.into()));
    }
    Ok(trimmed.to_string())
}

fn optional_image(raw: Option<String>, max_bytes: usize) -> AppResult<Option<String>> {
    match raw.filter(|img| !img.trim().is_empty()) {
        Some(img) => {
            image::validate(&img, max_bytes)?;
            Ok(Some(img))
        }
        None => Ok(None),
    }
}

// ============================================================================
// Plants
// ============================================================================

/// POST /api/plants
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlantRequest {
    #[validate(length(max = 200, message = "Plant name must be at most 200 characters."))]
    pub name: String,

    pub plant_type_id: Uuid,

    pub location_id: Uuid,

    #[validate(range(
        min = 1,
        max = 365,
        message = "Watering frequency must be between 1 and 365 days."
    ))]
    pub watering_frequency_days: i32,

    /// When the plant was last watered before it was added. Omitted means
    /// never watered.
    pub last_watered_date: Option<DateTime<Utc>>,

    /// Bare base64 or a `data:image/...;base64,` URI
    pub image_base64: Option<String>,
}

impl CreatePlantRequest {
    pub fn into_new_plant(self, now: DateTime<Utc>, max_image_bytes: usize) -> AppResult<NewPlant> {
        self.validate()?;

        let name = non_blank(&self.name, "The plant name is required.")?;
        if let Some(last) = self.last_watered_date {
            if last > now {
                return Err(AppError::Validation(
                    "Last watered date cannot be in the future.".into(),
                ));
            }
        }
        let image_base64 = optional_image(self.image_base64, max_image_bytes)?;

        Ok(NewPlant {
            name,
            plant_type_id: self.plant_type_id,
            location_id: self.location_id,
            watering_frequency_days: self.watering_frequency_days,
            last_watered_date: self.last_watered_date,
            image_base64,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantResponse {
    pub id: Uuid,
    pub name: String,
    pub plant_type_id: Uuid,
    pub plant_type_name: String,
    pub location_id: Uuid,
    pub location_name: String,
    pub watering_frequency_days: i32,
    pub last_watered_date: Option<DateTime<Utc>>,
    pub next_watering_date: Option<DateTime<Utc>>,
    /// Whole days until the next watering, negative when overdue. Absent for
    /// never-watered plants.
    pub days_until_next_watering: Option<i64>,
    pub status: WateringStatus,
    /// The plant's own image or its type's default
    pub image_base64: Option<String>,
}

impl PlantResponse {
    pub fn from_details(details: &PlantDetails, now: DateTime<Utc>) -> Result<Self, InvalidScheduleError> {
        let schedule = details.schedule();
        let plant = &details.plant;

        Ok(Self {
            id: plant.id,
            name: plant.name.clone(),
            plant_type_id: plant.plant_type_id,
            plant_type_name: details.plant_type_name.clone(),
            location_id: plant.location_id,
            location_name: details.location_name.clone(),
            watering_frequency_days: plant.watering_frequency_days,
            last_watered_date: plant.last_watered_date,
            next_watering_date: schedule.next_watering(),
            days_until_next_watering: schedule
                .time_until_next_watering(now)
                .map(|d| d.num_days()),
            status: schedule.status(now)?,
            image_base64: details.display_image().map(String::from),
        })
    }

    pub fn from_many<'a, I>(plants: I, now: DateTime<Utc>) -> Result<Vec<Self>, InvalidScheduleError>
    where
        I: IntoIterator<Item = &'a PlantDetails>,
    {
        plants
            .into_iter()
            .map(|p| Self::from_details(p, now))
            .collect()
    }
}

/// PUT /api/plants/:id/water
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WateringRecordedResponse {
    pub plant_id: Uuid,
    pub last_watered_date: Option<DateTime<Utc>>,
    pub next_watering_date: Option<DateTime<Utc>>,
    pub status: WateringStatus,
    pub care_event: CareEventResponse,
}

impl WateringRecordedResponse {
    pub fn new(
        plant: &Plant,
        event: CareEvent,
        now: DateTime<Utc>,
    ) -> Result<Self, InvalidScheduleError> {
        let schedule = plant.schedule();
        Ok(Self {
            plant_id: plant.id,
            last_watered_date: plant.last_watered_date,
            next_watering_date: schedule.next_watering(),
            status: schedule.status(now)?,
            care_event: event.into(),
        })
    }
}

// ============================================================================
// Plant types
// ============================================================================

/// POST /api/plant-types
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlantTypeRequest {
    #[validate(length(max = 100, message = "Plant type name must be at most 100 characters."))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be under 2000 characters."))]
    pub description: Option<String>,

    pub default_image_base64: Option<String>,
}

impl CreatePlantTypeRequest {
    pub fn into_new_plant_type(self, max_image_bytes: usize) -> AppResult<NewPlantType> {
        self.validate()?;
        let name = non_blank(&self.name, "Invalid plant type data.")?;

        Ok(NewPlantType {
            name: normalize_name(&name),
            description: self.description.unwrap_or_default().trim().to_string(),
            default_image_base64: optional_image(self.default_image_base64, max_image_bytes)?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantTypeResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub default_image_base64: Option<String>,
}

impl From<PlantType> for PlantTypeResponse {
    fn from(t: PlantType) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            default_image_base64: t.default_image_base64,
        }
    }
}

// ============================================================================
// Locations
// ============================================================================

/// POST /api/locations
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    #[validate(length(max = 100, message = "Location name must be at most 100 characters."))]
    pub name: String,
}

impl CreateLocationRequest {
    pub fn into_new_location(self) -> AppResult<NewLocation> {
        self.validate()?;
        let name = non_blank(&self.name, "Invalid location data.")?;
        Ok(NewLocation {
            name: normalize_name(&name),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Location> for LocationResponse {
    fn from(l: Location) -> Self {
        Self {
            id: l.id,
            name: l.name,
        }
    }
}

// ============================================================================
// Care history
// ============================================================================

/// POST /api/care-history — the care date is always the server's clock
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCareEventRequest {
    pub plant_id: Uuid,

    #[validate(length(max = 50, message = "Care type must be at most 50 characters."))]
    pub care_type: String,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters."))]
    pub notes: Option<String>,
}

impl CreateCareEventRequest {
    pub fn into_care_event(self, now: DateTime<Utc>) -> AppResult<CareEvent> {
        self.validate()?;
        let care_type = non_blank(&self.care_type, "Care type is required.")?;
        if care_type.eq_ignore_ascii_case(WATERING_CARE_TYPE) {
            return Err(AppError::Validation(
                "Record waterings with PUT /api/plants/:id/water.".into(),
            ));
        }
        let notes = self.notes.unwrap_or_default().trim().to_string();
        Ok(CareEvent::new(self.plant_id, care_type, notes, now))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareEventResponse {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub care_type: String,
    pub care_date: DateTime<Utc>,
    pub notes: String,
}

impl From<CareEvent> for CareEventResponse {
    fn from(e: CareEvent) -> Self {
        Self {
            id: e.id,
            plant_id: e.plant_id,
            care_type: e.care_type,
            care_date: e.care_date,
            notes: e.notes,
        }
    }
}

/// GET /api/care-history/stats/watered-this-week
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyWateringStats {
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    pub count: i64,
}

impl WeeklyWateringStats {
    pub fn new(week: WeekBounds, count: i64) -> Self {
        Self {
            week_start: week.start,
            week_end: week.end,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap()
    }

    fn plant_request() -> CreatePlantRequest {
        CreatePlantRequest {
            name: "  Monstera ".into(),
            plant_type_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            watering_frequency_days: 7,
            last_watered_date: None,
            image_base64: Some(String::new()),
        }
    }

    fn validation_message(result: AppResult<impl std::fmt::Debug>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("  living ROOM "), "Living room");
        assert_eq!(normalize_name("herb"), "Herb");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn plant_request_is_trimmed_and_image_dropped_when_empty() {
        let new_plant = plant_request().into_new_plant(now(), 1024).unwrap();
        assert_eq!(new_plant.name, "Monstera");
        assert_eq!(new_plant.image_base64, None);
        assert_eq!(new_plant.last_watered_date, None);
    }

    #[test]
    fn plant_request_rejects_bad_frequency() {
        for days in [0, -1, 366] {
            let request = CreatePlantRequest {
                watering_frequency_days: days,
                ..plant_request()
            };
            let msg = validation_message(request.into_new_plant(now(), 1024));
            assert_eq!(msg, "Watering frequency must be between 1 and 365 days.");
        }
    }

    #[test]
    fn plant_request_rejects_blank_name_and_future_date() {
        let blank = CreatePlantRequest {
            name: "   ".into(),
            ..plant_request()
        };
        assert_eq!(
            validation_message(blank.into_new_plant(now(), 1024)),
            "The plant name is required."
        );

        let future = CreatePlantRequest {
            last_watered_date: Some(now() + Duration::days(1)),
            ..plant_request()
        };
        assert!(validation_message(future.into_new_plant(now(), 1024)).contains("future"));
    }

    #[test]
    fn plant_request_validates_image() {
        let request = CreatePlantRequest {
            image_base64: Some("%%%".into()),
            ..plant_request()
        };
        assert_eq!(
            validation_message(request.into_new_plant(now(), 1024)),
            "Image is not valid base64"
        );
    }

    #[test]
    fn plant_type_request_normalizes() {
        let request = CreatePlantTypeRequest {
            name: " fern".into(),
            description: None,
            default_image_base64: None,
        };
        let new_type = request.into_new_plant_type(1024).unwrap();
        assert_eq!(new_type.name, "Fern");
        assert_eq!(new_type.description, "");
    }

    #[test]
    fn plant_response_falls_back_to_type_image() {
        let details = PlantDetails {
            plant: Plant {
                id: Uuid::new_v4(),
                name: "Aloe".into(),
                plant_type_id: Uuid::new_v4(),
                location_id: Uuid::new_v4(),
                watering_frequency_days: 7,
                last_watered_date: Some(now() - Duration::days(5)),
                image_base64: None,
                created_at: now(),
            },
            plant_type_name: "Succulent".into(),
            plant_type_default_image: Some("c3VjYw==".into()),
            location_name: "Garden".into(),
        };

        let response = PlantResponse::from_details(&details, now()).unwrap();
        assert_eq!(response.status, WateringStatus::DueSoon);
        assert_eq!(response.image_base64.as_deref(), Some("c3VjYw=="));
        assert_eq!(response.days_until_next_watering, Some(2));
        assert_eq!(response.next_watering_date, Some(now() + Duration::days(2)));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "Due Soon");
        assert_eq!(json["plantTypeName"], "Succulent");
        assert!(json.get("wateringFrequencyDays").is_some());
    }

    #[test]
    fn care_event_request_rejects_watering() {
        for care_type in ["Watering", " watering ", "WATERING"] {
            let request = CreateCareEventRequest {
                plant_id: Uuid::new_v4(),
                care_type: care_type.into(),
                notes: None,
            };
            let msg = validation_message(request.into_care_event(now()));
            assert!(msg.contains("/water"), "{care_type}: {msg}");
        }

        let request = CreateCareEventRequest {
            plant_id: Uuid::new_v4(),
            care_type: "Misting".into(),
            notes: None,
        };
        assert_eq!(request.into_care_event(now()).unwrap().care_type, "Misting");
    }

    #[test]
    fn envelope_shape() {
        let json = serde_json::to_value(ResponseDto::success(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "data": 3, "hasErrors": false, "errors": [] }));

        let json = serde_json::to_value(ResponseDto::<()>::failure(vec!["nope".into()])).unwrap();
        assert_eq!(json, serde_json::json!({ "data": null, "hasErrors": true, "errors": ["nope"] }));
    }
}
