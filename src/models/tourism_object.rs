//! Tourism object model (route, site or point inside a protected area)

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{ObjectType, TourismType};
use crate::engine::{capacity::ObjectCapacity, ObjectInput, RouteSegment, VisitParameters};

/// Tourism object record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TourismObject {
    pub id: i32,
    /// Owning protected area
    pub protected_area_id: i32,
    pub name: String,
    pub object_type: ObjectType,
    pub tourism_type: TourismType,
    /// Point, line or polygon as GeoJSON (EPSG:4326)
    #[schema(value_type = Option<Object>)]
    pub geometry: Option<serde_json::Value>,
    /// Route length in km (derived for lines)
    pub length_km: Option<f64>,
    /// Area in m² (derived for polygons and buffered points)
    pub area_sq_m: Option<f64>,
    /// Buffer radius giving a point object its area
    pub buffer_radius_m: Option<f64>,
    /// Area (m²) or trail length (m) per visitor
    pub area_per_visitor: Option<f64>,
    pub operating_hours: Option<f64>,
    /// Average visit duration in hours
    pub avg_visit_duration: Option<f64>,
    pub avg_group_size: Option<f64>,
    /// Manageable share of potential capacity, in [0, 1]
    pub management_factor: Option<f64>,
    /// Named correction coefficients (Cf1, Cf2, ...)
    #[schema(value_type = Object)]
    pub correction_factors: Json<IndexMap<String, f64>>,
    #[schema(value_type = Vec<RouteSegment>)]
    pub route_segments: Json<Vec<RouteSegment>>,
    pub return_factor: Option<f64>,
    /// Combined correction applied by the last calculation
    pub correction_value: Option<f64>,
    pub base_capacity: Option<f64>,
    pub potential_capacity: Option<f64>,
    /// Final permissible capacity (PDRE)
    pub pdre_capacity: Option<f64>,
    pub data_source: Option<String>,
    pub is_active: bool,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
    /// Zoned limiting factors intersecting this object, only loaded for calculations
    #[sqlx(default)]
    #[serde(skip)]
    pub intersecting_zone_ids: Vec<i32>,
}

impl TourismObject {
    pub fn to_input(&self) -> ObjectInput {
        ObjectInput {
            id: self.id,
            name: self.name.clone(),
            object_type: self.object_type,
            is_active: self.is_active,
            has_geometry: self.geometry.is_some(),
            length_km: self.length_km,
            area_sq_m: self.area_sq_m,
            parameters: VisitParameters {
                area_per_visitor: self.area_per_visitor,
                operating_hours: self.operating_hours,
                avg_visit_duration: self.avg_visit_duration,
                avg_group_size: self.avg_group_size,
                management_factor: self.management_factor,
            },
            correction_factors: self.correction_factors.0.clone(),
            route_segments: self.route_segments.0.clone(),
            intersecting_zone_ids: self.intersecting_zone_ids.clone(),
        }
    }
}

/// Computed fields written back after a calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedCapacity {
    pub object_id: i32,
    pub return_factor: f64,
    pub correction_value: f64,
    pub base_capacity: f64,
    pub potential_capacity: f64,
    pub pdre_capacity: f64,
}

impl From<&ObjectCapacity> for ComputedCapacity {
    fn from(c: &ObjectCapacity) -> Self {
        Self {
            object_id: c.object_id,
            return_factor: c.return_factor.value,
            correction_value: c.correction.value,
            base_capacity: c.base_capacity,
            potential_capacity: c.potential_capacity,
            pdre_capacity: c.pdre_capacity,
        }
    }
}

/// Response of a single-object recalculation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecalculatedObject {
    pub object: TourismObject,
    /// Every intermediate figure of the calculation
    #[schema(value_type = Object)]
    pub capacity: ObjectCapacity,
}

/// Create tourism object request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTourismObject {
    pub protected_area_id: i32,
    #[validate(length(min = 1, max = 500, message = "Name must be 1 to 500 characters"))]
    pub name: String,
    pub object_type: ObjectType,
    pub tourism_type: TourismType,
    #[schema(value_type = Option<Object>)]
    pub geometry: Option<serde_json::Value>,
    #[validate(range(min = 0.0))]
    pub length_km: Option<f64>,
    #[validate(range(min = 0.0))]
    pub area_sq_m: Option<f64>,
    #[validate(range(min = 0.0))]
    pub buffer_radius_m: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Area per visitor must be positive"))]
    pub area_per_visitor: Option<f64>,
    #[validate(range(min = 0.0, max = 24.0))]
    pub operating_hours: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Visit duration must be positive"))]
    pub avg_visit_duration: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub avg_group_size: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "Management factor must be within [0, 1]"))]
    pub management_factor: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub correction_factors: Option<IndexMap<String, f64>>,
    pub route_segments: Option<Vec<RouteSegment>>,
    pub data_source: Option<String>,
    pub is_active: Option<bool>,
}

/// Update tourism object request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTourismObject {
    #[validate(length(min = 1, max = 500, message = "Name must be 1 to 500 characters"))]
    pub name: Option<String>,
    pub object_type: Option<ObjectType>,
    pub tourism_type: Option<TourismType>,
    #[schema(value_type = Option<Object>)]
    pub geometry: Option<serde_json::Value>,
    #[validate(range(min = 0.0))]
    pub length_km: Option<f64>,
    #[validate(range(min = 0.0))]
    pub area_sq_m: Option<f64>,
    #[validate(range(min = 0.0))]
    pub buffer_radius_m: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Area per visitor must be positive"))]
    pub area_per_visitor: Option<f64>,
    #[validate(range(min = 0.0, max = 24.0))]
    pub operating_hours: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Visit duration must be positive"))]
    pub avg_visit_duration: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub avg_group_size: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "Management factor must be within [0, 1]"))]
    pub management_factor: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub correction_factors: Option<IndexMap<String, f64>>,
    pub route_segments: Option<Vec<RouteSegment>>,
    pub data_source: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for listing tourism objects
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TourismObjectQuery {
    /// Restrict to one protected area
    pub protected_area: Option<i32>,
}
