use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::dto::{CreatePlantTypeRequest, PlantTypeResponse, ResponseDto};
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::AppState;

pub async fn list_plant_types(
    State(state): State<AppState>,
) -> AppResult<Json<ResponseDto<Vec<PlantTypeResponse>>>> {
    let types = state.store.list_plant_types().await?;
    let response = types.into_iter().map(PlantTypeResponse::from).collect();
    Ok(Json(ResponseDto::success(response)))
}

pub async fn create_plant_type(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreatePlantTypeRequest>,
) -> AppResult<(StatusCode, Json<ResponseDto<PlantTypeResponse>>)> {
    let new_type = req.into_new_plant_type(state.config.max_image_bytes)?;
    let plant_type = state.store.insert_plant_type(new_type, Utc::now()).await?;

    tracing::info!(plant_type_id = %plant_type.id, name = %plant_type.name, "Plant type created");

    Ok((
        StatusCode::CREATED,
        Json(ResponseDto::success(plant_type.into())),
    ))
}
