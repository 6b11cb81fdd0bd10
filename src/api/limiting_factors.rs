//! Limiting factor endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::limiting_factor::{
        CreateLimitingFactor, LimitingFactor, LimitingFactorQuery, UpdateLimitingFactor,
    },
};

/// List limiting factors
#[utoipa::path(
    get,
    path = "/limiting-factors",
    tag = "limiting_factors",
    params(LimitingFactorQuery),
    responses(
        (status = 200, description = "Limiting factors", body = Vec<LimitingFactor>),
        (status = 400, description = "Unknown factor type", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_factors(
    State(state): State<crate::AppState>,
    Query(query): Query<LimitingFactorQuery>,
) -> AppResult<Json<Vec<LimitingFactor>>> {
    let factors = state.services.limiting_factors.list(query.factor_type).await?;
    Ok(Json(factors))
}

/// Get a limiting factor by ID
#[utoipa::path(
    get,
    path = "/limiting-factors/{id}",
    tag = "limiting_factors",
    params(("id" = i32, Path, description = "Limiting factor ID")),
    responses(
        (status = 200, description = "Limiting factor details", body = LimitingFactor),
        (status = 404, description = "Limiting factor not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_factor(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LimitingFactor>> {
    let factor = state.services.limiting_factors.get_by_id(id).await?;
    Ok(Json(factor))
}

/// Create a limiting factor
#[utoipa::path(
    post,
    path = "/limiting-factors",
    tag = "limiting_factors",
    request_body = CreateLimitingFactor,
    responses(
        (status = 201, description = "Limiting factor created", body = LimitingFactor),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_factor(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateLimitingFactor>,
) -> AppResult<(StatusCode, Json<LimitingFactor>)> {
    let factor = state.services.limiting_factors.create(&data).await?;
    Ok((StatusCode::CREATED, Json(factor)))
}

/// Update a limiting factor
#[utoipa::path(
    put,
    path = "/limiting-factors/{id}",
    tag = "limiting_factors",
    params(("id" = i32, Path, description = "Limiting factor ID")),
    request_body = UpdateLimitingFactor,
    responses(
        (status = 200, description = "Limiting factor updated", body = LimitingFactor),
        (status = 404, description = "Limiting factor not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_factor(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateLimitingFactor>,
) -> AppResult<Json<LimitingFactor>> {
    let factor = state.services.limiting_factors.update(id, &data).await?;
    Ok(Json(factor))
}

/// Delete a limiting factor
#[utoipa::path(
    delete,
    path = "/limiting-factors/{id}",
    tag = "limiting_factors",
    params(("id" = i32, Path, description = "Limiting factor ID")),
    responses(
        (status = 204, description = "Limiting factor deleted"),
        (status = 404, description = "Limiting factor not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_factor(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.limiting_factors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
