//! Protected area endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        calculation_result::{CalculationRequest, CalculationResult, QuickCalculation},
        protected_area::{CreateProtectedArea, ProtectedArea, UpdateProtectedArea},
        tourism_object::TourismObject,
    },
};

/// List protected areas
#[utoipa::path(
    get,
    path = "/protected-areas",
    tag = "protected_areas",
    responses(
        (status = 200, description = "Protected areas", body = Vec<ProtectedArea>)
    )
)]
pub async fn list_areas(State(state): State<crate::AppState>) -> AppResult<Json<Vec<ProtectedArea>>> {
    let areas = state.services.protected_areas.list().await?;
    Ok(Json(areas))
}

/// Get a protected area by ID
#[utoipa::path(
    get,
    path = "/protected-areas/{id}",
    tag = "protected_areas",
    params(("id" = i32, Path, description = "Protected area ID")),
    responses(
        (status = 200, description = "Protected area details", body = ProtectedArea),
        (status = 404, description = "Protected area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_area(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ProtectedArea>> {
    let area = state.services.protected_areas.get_by_id(id).await?;
    Ok(Json(area))
}

/// Create a protected area
#[utoipa::path(
    post,
    path = "/protected-areas",
    tag = "protected_areas",
    request_body = CreateProtectedArea,
    responses(
        (status = 201, description = "Protected area created", body = ProtectedArea),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_area(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateProtectedArea>,
) -> AppResult<(StatusCode, Json<ProtectedArea>)> {
    let area = state.services.protected_areas.create(&data).await?;
    Ok((StatusCode::CREATED, Json(area)))
}

/// Update a protected area
#[utoipa::path(
    put,
    path = "/protected-areas/{id}",
    tag = "protected_areas",
    params(("id" = i32, Path, description = "Protected area ID")),
    request_body = UpdateProtectedArea,
    responses(
        (status = 200, description = "Protected area updated", body = ProtectedArea),
        (status = 404, description = "Protected area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_area(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateProtectedArea>,
) -> AppResult<Json<ProtectedArea>> {
    let area = state.services.protected_areas.update(id, &data).await?;
    Ok(Json(area))
}

/// Delete a protected area with its objects and calculation history
#[utoipa::path(
    delete,
    path = "/protected-areas/{id}",
    tag = "protected_areas",
    params(("id" = i32, Path, description = "Protected area ID")),
    responses(
        (status = 204, description = "Protected area deleted"),
        (status = 404, description = "Protected area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_area(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.protected_areas.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Active tourism objects of a protected area
#[utoipa::path(
    get,
    path = "/protected-areas/{id}/tourism-objects",
    tag = "protected_areas",
    params(("id" = i32, Path, description = "Protected area ID")),
    responses(
        (status = 200, description = "Active tourism objects", body = Vec<TourismObject>),
        (status = 404, description = "Protected area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_area_objects(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<TourismObject>>> {
    let objects = state.services.protected_areas.active_objects(id).await?;
    Ok(Json(objects))
}

/// Calculation history of a protected area, newest first
#[utoipa::path(
    get,
    path = "/protected-areas/{id}/calculations",
    tag = "calculations",
    params(("id" = i32, Path, description = "Protected area ID")),
    responses(
        (status = 200, description = "Calculation results", body = Vec<CalculationResult>),
        (status = 404, description = "Protected area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_area_calculations(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<CalculationResult>>> {
    let results = state.services.protected_areas.calculations(id).await?;
    Ok(Json(results))
}

/// Start a PDRE calculation for a protected area
#[utoipa::path(
    post,
    path = "/protected-areas/{id}/calculate",
    tag = "calculations",
    params(("id" = i32, Path, description = "Protected area ID")),
    request_body = CalculationRequest,
    responses(
        (status = 202, description = "Calculation queued", body = CalculationResult),
        (status = 404, description = "Protected area not found", body = crate::error::ErrorResponse),
        (status = 409, description = "A calculation is already running", body = crate::error::ErrorResponse)
    )
)]
pub async fn calculate_area(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    data: Option<Json<CalculationRequest>>,
) -> AppResult<(StatusCode, Json<CalculationResult>)> {
    let request = data.map(|Json(r)| r).unwrap_or_default();
    let pending = state.services.calculation.start(id, &request).await?;
    Ok((StatusCode::ACCEPTED, Json(pending)))
}

/// Compute the PDRE of a protected area without recording a result
#[utoipa::path(
    post,
    path = "/protected-areas/{id}/quick-calculate",
    tag = "calculations",
    params(("id" = i32, Path, description = "Protected area ID")),
    request_body = CalculationRequest,
    responses(
        (status = 200, description = "Calculated figures", body = QuickCalculation),
        (status = 404, description = "Protected area not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Area cannot be calculated", body = crate::error::ErrorResponse)
    )
)]
pub async fn quick_calculate(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    data: Option<Json<CalculationRequest>>,
) -> AppResult<Json<QuickCalculation>> {
    let request = data.map(|Json(r)| r).unwrap_or_default();
    let result = state.services.calculation.quick_calculate(id, &request).await?;
    Ok(Json(result))
}
