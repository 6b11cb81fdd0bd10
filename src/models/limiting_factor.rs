//! Limiting factor model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::FactorType;
use crate::engine::FactorInput;

/// Limiting factor record: a named attenuation source applied to protected areas
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LimitingFactor {
    pub id: i32,
    pub name: String,
    pub factor_type: FactorType,
    pub description: Option<String>,
    /// Attenuation coefficient in [0, 1]
    pub coefficient_value: f64,
    /// Human-readable derivation of the coefficient
    pub calculation_formula: Option<String>,
    /// Applies to every protected area without explicit association
    pub apply_to_all: bool,
    /// Explicitly associated protected areas
    pub protected_area_ids: Vec<i32>,
    /// Zone of influence as GeoJSON; only intersecting objects are attenuated
    #[schema(value_type = Option<Object>)]
    pub zone: Option<serde_json::Value>,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl LimitingFactor {
    pub fn to_input(&self) -> FactorInput {
        FactorInput {
            id: self.id,
            name: self.name.clone(),
            factor_type: self.factor_type,
            coefficient: self.coefficient_value,
            apply_to_all: self.apply_to_all,
            area_ids: self.protected_area_ids.clone(),
            has_zone: self.zone.is_some(),
        }
    }
}

/// Create limiting factor request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLimitingFactor {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
    pub factor_type: FactorType,
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1.0, message = "Coefficient must be within [0, 1]"))]
    pub coefficient_value: f64,
    pub calculation_formula: Option<String>,
    /// Defaults to true
    pub apply_to_all: Option<bool>,
    pub protected_area_ids: Option<Vec<i32>>,
    #[schema(value_type = Option<Object>)]
    pub zone: Option<serde_json::Value>,
}

/// Update limiting factor request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLimitingFactor {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: Option<String>,
    pub factor_type: Option<FactorType>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1.0, message = "Coefficient must be within [0, 1]"))]
    pub coefficient_value: Option<f64>,
    pub calculation_formula: Option<String>,
    pub apply_to_all: Option<bool>,
    /// Replaces the explicit associations when present
    pub protected_area_ids: Option<Vec<i32>>,
    #[schema(value_type = Option<Object>)]
    pub zone: Option<serde_json::Value>,
}

/// Query parameters for listing limiting factors
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LimitingFactorQuery {
    /// Restrict to one factor type
    pub factor_type: Option<FactorType>,
}
