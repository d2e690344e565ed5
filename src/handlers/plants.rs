use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::dto::{CreatePlantRequest, PlantResponse, ResponseDto, WateringRecordedResponse};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::plant::PlantDetails;
use crate::services::watering::{order_by_urgency, HasSchedule, WateringStatus};
use crate::AppState;

async fn cached_plants(state: &AppState) -> AppResult<Arc<Vec<PlantDetails>>> {
    let plants = state
        .plants_cache
        .get_or_fetch(|| state.store.list_plants())
        .await?;
    Ok(plants)
}

async fn find_plant(state: &AppState, id: Uuid) -> AppResult<PlantDetails> {
    state
        .store
        .get_plant(id)
        .await?
        .ok_or(AppError::NotFound("Plant not found.".into()))
}

pub async fn list_plants(
    State(state): State<AppState>,
) -> AppResult<Json<ResponseDto<Vec<PlantResponse>>>> {
    let plants = cached_plants(&state).await?;
    let response = PlantResponse::from_many(plants.iter(), Utc::now())?;
    Ok(Json(ResponseDto::success(response)))
}

pub async fn get_plant(
    State(state): State<AppState>,
    AppPath(plant_id): AppPath<Uuid>,
) -> AppResult<Json<ResponseDto<PlantResponse>>> {
    let plant = find_plant(&state, plant_id).await?;
    let response = PlantResponse::from_details(&plant, Utc::now())?;
    Ok(Json(ResponseDto::success(response)))
}

pub async fn create_plant(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreatePlantRequest>,
) -> AppResult<(StatusCode, Json<ResponseDto<PlantResponse>>)> {
    let now = Utc::now();
    let new_plant = req.into_new_plant(now, state.config.max_image_bytes)?;
    let plant = state.store.insert_plant(new_plant, now).await?;
    state.plants_cache.invalidate().await;

    tracing::info!(
        plant_id = %plant.plant.id,
        name = %plant.plant.name,
        frequency_days = plant.plant.watering_frequency_days,
        "Plant created"
    );

    let response = PlantResponse::from_details(&plant, now)?;
    Ok((StatusCode::CREATED, Json(ResponseDto::success(response))))
}

pub async fn get_plant_status(
    State(state): State<AppState>,
    AppPath(plant_id): AppPath<Uuid>,
) -> AppResult<Json<ResponseDto<WateringStatus>>> {
    let plant = find_plant(&state, plant_id).await?;
    let status = plant.schedule().status(Utc::now())?;
    Ok(Json(ResponseDto::success(status)))
}

/// The plant's own image or its type's default; `data` is null when neither
/// exists.
pub async fn get_plant_image(
    State(state): State<AppState>,
    AppPath(plant_id): AppPath<Uuid>,
) -> AppResult<Json<ResponseDto<Option<String>>>> {
    let plant = find_plant(&state, plant_id).await?;
    let image = plant.display_image().map(String::from);
    Ok(Json(ResponseDto::success(image)))
}

pub async fn water_plant(
    State(state): State<AppState>,
    AppPath(plant_id): AppPath<Uuid>,
) -> AppResult<Json<ResponseDto<WateringRecordedResponse>>> {
    let now = Utc::now();
    let (plant, event) = state.store.record_watering(plant_id, now).await?;
    state.plants_cache.invalidate().await;

    tracing::info!(
        plant_id = %plant.id,
        note = %event.notes,
        "Watering recorded"
    );

    let response = WateringRecordedResponse::new(&plant, event, now)?;
    Ok(Json(ResponseDto::success(response)))
}

/// Overdue plants, most urgent first.
pub async fn list_due_plants(
    State(state): State<AppState>,
) -> AppResult<Json<ResponseDto<Vec<PlantResponse>>>> {
    let now = Utc::now();
    let plants = cached_plants(&state).await?;

    let mut due = Vec::new();
    for plant in order_by_urgency(plants.iter().collect::<Vec<_>>(), now) {
        if plant.schedule().status(now)? == WateringStatus::Overdue {
            due.push(PlantResponse::from_details(plant, now)?);
        }
    }

    Ok(Json(ResponseDto::success(due)))
}

pub async fn list_plants_by_urgency(
    State(state): State<AppState>,
) -> AppResult<Json<ResponseDto<Vec<PlantResponse>>>> {
    let now = Utc::now();
    let plants = cached_plants(&state).await?;
    let ordered = order_by_urgency(plants.iter().collect::<Vec<_>>(), now);
    let response = PlantResponse::from_many(ordered, now)?;
    Ok(Json(ResponseDto::success(response)))
}

pub async fn group_plants_by_location(
    State(state): State<AppState>,
) -> AppResult<Json<ResponseDto<BTreeMap<String, Vec<PlantResponse>>>>> {
    let now = Utc::now();
    let plants = cached_plants(&state).await?;

    let mut groups: BTreeMap<String, Vec<PlantResponse>> = BTreeMap::new();
    for plant in plants.iter() {
        groups
            .entry(plant.location_name.clone())
            .or_default()
            .push(PlantResponse::from_details(plant, now)?);
    }

    Ok(Json(ResponseDto::success(groups)))
}
