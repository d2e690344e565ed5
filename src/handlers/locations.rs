use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::dto::{CreateLocationRequest, LocationResponse, ResponseDto};
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::AppState;

pub async fn list_locations(
    State(state): State<AppState>,
) -> AppResult<Json<ResponseDto<Vec<LocationResponse>>>> {
    let locations = state.store.list_locations().await?;
    let response = locations.into_iter().map(LocationResponse::from).collect();
    Ok(Json(ResponseDto::success(response)))
}

pub async fn create_location(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateLocationRequest>,
) -> AppResult<(StatusCode, Json<ResponseDto<LocationResponse>>)> {
    let location = state
        .store
        .insert_location(req.into_new_location()?, Utc::now())
        .await?;

    tracing::info!(location_id = %location.id, name = %location.name, "Location created");

    Ok((StatusCode::CREATED, Json(ResponseDto::success(location.into()))))
}
