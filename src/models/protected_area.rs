//! Protected natural area model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::AreaType;
use crate::engine::AreaInput;

/// Protected area record.
///
/// `area_ha` is derived from the boundary by the database on every boundary
/// change and is never written by the application.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProtectedArea {
    pub id: i32,
    pub name: String,
    pub area_type: AreaType,
    /// Boundary polygon as GeoJSON (EPSG:4326)
    #[schema(value_type = Option<Object>)]
    pub boundary: Option<serde_json::Value>,
    pub cadastral_number: Option<String>,
    pub description: Option<String>,
    /// Area in hectares, measured from the boundary
    pub area_ha: Option<f64>,
    /// Date of the last completed calculation
    pub calculation_date: Option<DateTime<Utc>>,
    /// Total PDRE of the last completed calculation
    pub pdre_value: Option<f64>,
    pub calculation_method: Option<String>,
    /// Free-form calculation parameters
    #[schema(value_type = Object)]
    pub calculation_parameters: serde_json::Value,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl ProtectedArea {
    pub fn to_input(&self) -> AreaInput {
        AreaInput {
            id: self.id,
            name: self.name.clone(),
            has_boundary: self.boundary.is_some(),
            area_ha: self.area_ha,
        }
    }
}

/// Create protected area request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProtectedArea {
    #[validate(length(min = 1, max = 500, message = "Name must be 1 to 500 characters"))]
    pub name: String,
    pub area_type: AreaType,
    /// Boundary polygon as GeoJSON (EPSG:4326)
    #[schema(value_type = Option<Object>)]
    pub boundary: Option<serde_json::Value>,
    pub cadastral_number: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub calculation_parameters: Option<serde_json::Value>,
}

/// Update protected area request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProtectedArea {
    #[validate(length(min = 1, max = 500, message = "Name must be 1 to 500 characters"))]
    pub name: Option<String>,
    pub area_type: Option<AreaType>,
    #[schema(value_type = Option<Object>)]
    pub boundary: Option<serde_json::Value>,
    pub cadastral_number: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub calculation_parameters: Option<serde_json::Value>,
}
