use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::dto::{CareEventResponse, CreateCareEventRequest, ResponseDto, WeeklyWateringStats};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::models::care_event::WATERING_CARE_TYPE;
use crate::services::stats::current_week;
use crate::AppState;

/// Care history for one plant, newest first.
pub async fn list_care_history(
    State(state): State<AppState>,
    AppPath(plant_id): AppPath<Uuid>,
) -> AppResult<Json<ResponseDto<Vec<CareEventResponse>>>> {
    let events = state.store.list_care_events(plant_id).await?;
    let response = events.into_iter().map(CareEventResponse::from).collect();
    Ok(Json(ResponseDto::success(response)))
}

/// Logs a non-watering care action (fertilising, repotting, ...). Watering
/// goes through `PUT /api/plants/:id/water` so the schedule is updated too.
pub async fn create_care_event(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateCareEventRequest>,
) -> AppResult<(StatusCode, Json<ResponseDto<CareEventResponse>>)> {
    let event = req.into_care_event(Utc::now())?;
    let event = state.store.append_care_event(event).await?;

    tracing::info!(
        plant_id = %event.plant_id,
        care_type = %event.care_type,
        "Care event recorded"
    );

    Ok((StatusCode::CREATED, Json(ResponseDto::success(event.into()))))
}

// Waterings in the current Sunday-to-Sunday UTC week
pub async fn watered_this_week(
    State(state): State<AppState>,
) -> AppResult<Json<ResponseDto<WeeklyWateringStats>>> {
    let week = current_week(Utc::now());
    let count = state
        .store
        .count_care_events(WATERING_CARE_TYPE, week.start, week.end)
        .await?;
    Ok(Json(ResponseDto::success(WeeklyWateringStats::new(week, count))))
}
