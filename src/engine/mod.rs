//! PDRE calculation engine
//!
//! Turns geometric and behavioral inputs of tourism objects into base,
//! potential and final permissible capacity, and rolls them up per protected
//! area. Everything here is synchronous and free of I/O: inputs arrive as
//! plain values already loaded by the repository layer.

pub mod aggregate;
pub mod capacity;
pub mod correction;
pub mod geometry;
pub mod orchestrator;
pub mod return_factor;

use indexmap::IndexMap;

use crate::models::enums::{FactorType, ObjectType};

pub use aggregate::{AreaAggregator, AreaTotals};
pub use capacity::{ObjectCapacity, ObjectCapacityCalculator};
pub use correction::{Coefficient, Correction, CorrectionFactorResolver, CorrectionFactors};
pub use geometry::{GeometryMetrics, PhysicalSize, StoredMetrics};
pub use orchestrator::{AreaCalculation, CalculationDetails, CalculationOrchestrator, CalculationRun};
pub use return_factor::{ReturnFactor, ReturnFactorCalculator, RouteSegment};

/// Protected area as seen by the engine
#[derive(Debug, Clone)]
pub struct AreaInput {
    pub id: i32,
    pub name: String,
    pub has_boundary: bool,
    /// Boundary area in hectares, measured by the geometry collaborator
    pub area_ha: Option<f64>,
}

/// Behavioral parameters of an object; `None` resolves from the run defaults
#[derive(Debug, Clone, Default)]
pub struct VisitParameters {
    pub area_per_visitor: Option<f64>,
    pub operating_hours: Option<f64>,
    pub avg_visit_duration: Option<f64>,
    pub avg_group_size: Option<f64>,
    pub management_factor: Option<f64>,
}

/// Tourism object as seen by the engine
#[derive(Debug, Clone)]
pub struct ObjectInput {
    pub id: i32,
    pub name: String,
    pub object_type: ObjectType,
    pub is_active: bool,
    pub has_geometry: bool,
    /// Route length in km (linear objects)
    pub length_km: Option<f64>,
    /// Area in m² (areal objects, buffered points)
    pub area_sq_m: Option<f64>,
    pub parameters: VisitParameters,
    /// Object-specific correction coefficients, as stored
    pub correction_factors: IndexMap<String, f64>,
    pub route_segments: Vec<RouteSegment>,
    /// Zoned limiting factors whose zone intersects this object's geometry
    pub intersecting_zone_ids: Vec<i32>,
}

/// Limiting factor as seen by the engine
#[derive(Debug, Clone)]
pub struct FactorInput {
    pub id: i32,
    pub name: String,
    pub factor_type: FactorType,
    pub coefficient: f64,
    pub apply_to_all: bool,
    /// Explicitly associated protected areas
    pub area_ids: Vec<i32>,
    /// Whether the factor is restricted to a zone of influence
    pub has_zone: bool,
}

impl FactorInput {
    /// Global factors apply everywhere, others only to their listed areas
    pub fn applies_to_area(&self, area_id: i32) -> bool {
        self.apply_to_all || self.area_ids.contains(&area_id)
    }

    /// Unzoned factors reach every object; zoned ones only objects they intersect
    pub fn reaches(&self, object: &ObjectInput) -> bool {
        !self.has_zone || object.intersecting_zone_ids.contains(&self.id)
    }
}
