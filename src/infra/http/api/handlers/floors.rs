//! Floor handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::floors::FloorCommand;
use crate::application::repos::{FloorFilter, FloorQuery};

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_floors(
    State(state): State<ApiState>,
    query: Result<Query<FloorListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) =
        query.map_err(|err| ApiError::bad_request("invalid query", err.body_text()))?;
    let descriptor = floor_query(query)?;

    let floors = state.floors.list(&descriptor).await?;
    Ok(Json(
        floors.into_iter().map(FloorDto::from).collect::<Vec<_>>(),
    ))
}

pub async fn get_floor(
    State(state): State<ApiState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(invalid_id)?;
    let floor = state.floors.get(id).await?;
    Ok(Json(FloorDto::from(floor)))
}

pub async fn create_floor(
    State(state): State<ApiState>,
    payload: Result<Json<FloorWriteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(invalid_body)?;

    let floor = state
        .floors
        .create(FloorCommand {
            floor_number: payload.floor_number,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(FloorDto::from(floor))))
}

pub async fn update_floor(
    State(state): State<ApiState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<FloorWriteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(invalid_id)?;
    let Json(payload) = payload.map_err(invalid_body)?;

    let floor = state
        .floors
        .update(
            id,
            FloorCommand {
                floor_number: payload.floor_number,
            },
        )
        .await?;

    Ok(Json(FloorDto::from(floor)))
}

pub async fn delete_floor(
    State(state): State<ApiState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(invalid_id)?;
    let floor = state.floors.delete(id).await?;
    Ok(Json(FloorDto::from(floor)))
}

fn floor_query(query: FloorListQuery) -> Result<FloorQuery, ApiError> {
    let mut descriptor = FloorQuery::new(FloorFilter::by_number(query.floor_number.as_deref()))
        .descending(query.is_descending.unwrap_or(false));

    if let Some(sort_by) = query.sort_by {
        descriptor = descriptor.sort_by(sort_by);
    }
    if let Some(number) = query.page_number {
        descriptor = descriptor
            .page(number)
            .map_err(|err| ApiError::bad_request("invalid page", err.to_string()))?;
    }
    if let Some(size) = query.page_size {
        descriptor = descriptor
            .page_size(size)
            .map_err(|err| ApiError::bad_request("invalid page", err.to_string()))?;
    }

    Ok(descriptor)
}

fn invalid_id(err: PathRejection) -> ApiError {
    ApiError::bad_request("invalid floor id", err.body_text())
}

fn invalid_body(err: JsonRejection) -> ApiError {
    ApiError::bad_request("invalid request body", err.body_text())
}
