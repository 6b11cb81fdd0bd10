//! Tourism object endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::tourism_object::{
        CreateTourismObject, RecalculatedObject, TourismObject, TourismObjectQuery, UpdateTourismObject,
    },
};

/// List tourism objects
#[utoipa::path(
    get,
    path = "/tourism-objects",
    tag = "tourism_objects",
    params(TourismObjectQuery),
    responses(
        (status = 200, description = "Tourism objects", body = Vec<TourismObject>)
    )
)]
pub async fn list_objects(
    State(state): State<crate::AppState>,
    Query(query): Query<TourismObjectQuery>,
) -> AppResult<Json<Vec<TourismObject>>> {
    let objects = state.services.tourism_objects.list(query.protected_area).await?;
    Ok(Json(objects))
}

/// Get a tourism object by ID
#[utoipa::path(
    get,
    path = "/tourism-objects/{id}",
    tag = "tourism_objects",
    params(("id" = i32, Path, description = "Tourism object ID")),
    responses(
        (status = 200, description = "Tourism object details", body = TourismObject),
        (status = 404, description = "Tourism object not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_object(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<TourismObject>> {
    let object = state.services.tourism_objects.get_by_id(id).await?;
    Ok(Json(object))
}

/// Create a tourism object
#[utoipa::path(
    post,
    path = "/tourism-objects",
    tag = "tourism_objects",
    request_body = CreateTourismObject,
    responses(
        (status = 201, description = "Tourism object created", body = TourismObject),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Protected area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_object(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateTourismObject>,
) -> AppResult<(StatusCode, Json<TourismObject>)> {
    let object = state.services.tourism_objects.create(&data).await?;
    Ok((StatusCode::CREATED, Json(object)))
}

/// Update a tourism object
#[utoipa::path(
    put,
    path = "/tourism-objects/{id}",
    tag = "tourism_objects",
    params(("id" = i32, Path, description = "Tourism object ID")),
    request_body = UpdateTourismObject,
    responses(
        (status = 200, description = "Tourism object updated", body = TourismObject),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Tourism object not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_object(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateTourismObject>,
) -> AppResult<Json<TourismObject>> {
    let object = state.services.tourism_objects.update(id, &data).await?;
    Ok(Json(object))
}

/// Delete a tourism object
#[utoipa::path(
    delete,
    path = "/tourism-objects/{id}",
    tag = "tourism_objects",
    params(("id" = i32, Path, description = "Tourism object ID")),
    responses(
        (status = 204, description = "Tourism object deleted"),
        (status = 404, description = "Tourism object not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_object(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.tourism_objects.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recalculate the capacities of one tourism object
#[utoipa::path(
    post,
    path = "/tourism-objects/{id}/recalculate",
    tag = "tourism_objects",
    params(("id" = i32, Path, description = "Tourism object ID")),
    responses(
        (status = 200, description = "Capacities recalculated", body = RecalculatedObject),
        (status = 404, description = "Tourism object not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Object cannot be calculated", body = crate::error::ErrorResponse)
    )
)]
pub async fn recalculate_object(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<RecalculatedObject>> {
    let result = state.services.tourism_objects.recalculate(id).await?;
    Ok(Json(result))
}
