//! Physical size of tourism objects

use serde::Serialize;

use super::ObjectInput;
use crate::{error::CalculationError, models::enums::ObjectType};

/// Physical size in the metric unit the methodology expects for the object type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum PhysicalSize {
    LengthKm(f64),
    AreaSqM(f64),
}

impl PhysicalSize {
    pub fn value(&self) -> f64 {
        match self {
            PhysicalSize::LengthKm(v) | PhysicalSize::AreaSqM(v) => *v,
        }
    }

    /// Number of visitors the space holds at once.
    /// Route length is converted to metres so that `area_per_visitor` reads as
    /// metres of trail per visitor.
    pub fn visitors_at_once(&self, area_per_visitor: f64) -> f64 {
        match self {
            PhysicalSize::LengthKm(km) => km * 1000.0 / area_per_visitor,
            PhysicalSize::AreaSqM(sq_m) => sq_m / area_per_visitor,
        }
    }
}

/// Measurement collaborator: returns the metric length or area of an object.
#[cfg_attr(test, mockall::automock)]
pub trait GeometryMetrics {
    fn measure(&self, object: &ObjectInput) -> Result<PhysicalSize, CalculationError>;
}

/// Reads the length/area already measured by PostGIS and stored on the record
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredMetrics;

impl GeometryMetrics for StoredMetrics {
    fn measure(&self, object: &ObjectInput) -> Result<PhysicalSize, CalculationError> {
        if !object.has_geometry {
            return Err(CalculationError::Geometry(format!(
                "object '{}' has no geometry",
                object.name
            )));
        }

        let (size, wrap): (Option<f64>, fn(f64) -> PhysicalSize) = match object.object_type {
            ObjectType::Linear => (object.length_km, PhysicalSize::LengthKm),
            ObjectType::Areal | ObjectType::Point => (object.area_sq_m, PhysicalSize::AreaSqM),
        };

        match size {
            Some(v) if v.is_finite() && v >= 0.0 => Ok(wrap(v)),
            Some(v) => Err(CalculationError::Geometry(format!(
                "object '{}' has an invalid measured size {}",
                object.name, v
            ))),
            None => Err(CalculationError::Geometry(format!(
                "{} object '{}' could not be measured",
                object.object_type, object.name
            ))),
        }
    }
}
