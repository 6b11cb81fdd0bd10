//! Calculation result model (append-only, one record per run)

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;

use super::enums::{CalculationPeriod, CalculationStatus};
use crate::{
    engine::AreaCalculation,
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CalculationResult {
    pub id: i32,
    pub protected_area_id: i32,
    pub calculation_period: CalculationPeriod,
    pub status: CalculationStatus,
    /// Daily PDRE of the area; set on completion
    pub total_pdre: Option<f64>,
    /// Total scaled to the calculation period
    pub period_total: Option<f64>,
    /// Object name → final capacity, in object order
    #[schema(value_type = Object)]
    pub area_pdre: Json<IndexMap<String, f64>>,
    /// Inputs and intermediate values of every stage
    #[schema(value_type = Object)]
    pub calculation_details: serde_json::Value,
    /// Defaults and options the run used
    #[schema(value_type = Object)]
    pub input_parameters: serde_json::Value,
    pub error_message: Option<String>,
    pub calculation_date: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Request body for starting an area calculation
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CalculationRequest {
    /// Defaults to `month`
    pub calculation_period: Option<CalculationPeriod>,
}

/// Figures of an area calculation that was computed on request and not recorded
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuickCalculation {
    pub protected_area_id: i32,
    pub calculation_period: CalculationPeriod,
    pub total_pdre: f64,
    pub period_total: f64,
    /// Object name → final capacity, in object order
    #[schema(value_type = Object)]
    pub area_pdre: IndexMap<String, f64>,
    #[schema(value_type = Object)]
    pub calculation_details: serde_json::Value,
}

impl TryFrom<&AreaCalculation> for QuickCalculation {
    type Error = AppError;

    fn try_from(calculation: &AreaCalculation) -> AppResult<Self> {
        let calculation_details = serde_json::to_value(calculation.details())
            .map_err(|e| AppError::Internal(format!("Failed to serialize calculation details: {}", e)))?;

        Ok(Self {
            protected_area_id: calculation.area_id,
            calculation_period: calculation.period,
            total_pdre: calculation.total(),
            period_total: calculation.period_total(),
            area_pdre: calculation.totals.breakdown.clone(),
            calculation_details,
        })
    }
}
