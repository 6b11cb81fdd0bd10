//! Calculation result endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::calculation_result::CalculationResult};

/// Get a calculation result by ID
#[utoipa::path(
    get,
    path = "/calculations/{id}",
    tag = "calculations",
    params(("id" = i32, Path, description = "Calculation result ID")),
    responses(
        (status = 200, description = "Calculation result", body = CalculationResult),
        (status = 404, description = "Calculation not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_calculation(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<CalculationResult>> {
    let result = state.services.calculation.get_by_id(id).await?;
    Ok(Json(result))
}
