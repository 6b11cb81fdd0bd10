//! Capacity of a single tourism object
//!
//! BCC = visitors at once × return factor
//! PCC = BCC × correction
//! RCC = PCC × management factor
//!
//! Each stage is a non-expanding multiplication, so RCC ≤ PCC ≤ BCC whenever
//! the coefficients are within [0, 1].

use serde::Serialize;

use super::{
    correction::{Correction, CorrectionFactorResolver},
    geometry::{GeometryMetrics, PhysicalSize},
    return_factor::{ReturnFactor, ReturnFactorCalculator},
    FactorInput, ObjectInput,
};
use crate::{config::CalculationDefaults, error::CalculationError, models::enums::ObjectType};

/// Behavioral parameters after default resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParameters {
    pub area_per_visitor: f64,
    pub operating_hours: f64,
    pub avg_visit_duration: f64,
    pub avg_group_size: f64,
    pub management_factor: f64,
    /// Names of the parameters taken from the run defaults
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub from_defaults: Vec<&'static str>,
}

impl ResolvedParameters {
    fn resolve(object: &ObjectInput, defaults: &CalculationDefaults) -> Self {
        let mut from_defaults = Vec::new();
        let mut pick = |name: &'static str, value: Option<f64>, default: f64| {
            value.unwrap_or_else(|| {
                from_defaults.push(name);
                default
            })
        };

        let p = &object.parameters;
        let area_per_visitor = pick("area_per_visitor", p.area_per_visitor, defaults.area_per_visitor);
        let operating_hours = pick("operating_hours", p.operating_hours, defaults.operating_hours);
        let avg_visit_duration =
            pick("avg_visit_duration", p.avg_visit_duration, defaults.avg_visit_duration);
        let avg_group_size = pick("avg_group_size", p.avg_group_size, defaults.avg_group_size);
        let management_factor =
            pick("management_factor", p.management_factor, defaults.management_factor);

        Self {
            area_per_visitor,
            operating_hours,
            avg_visit_duration,
            avg_group_size,
            management_factor,
            from_defaults,
        }
    }

    fn validate(&self) -> Result<(), CalculationError> {
        if !self.area_per_visitor.is_finite() || self.area_per_visitor <= 0.0 {
            return Err(CalculationError::Configuration(format!(
                "area per visitor must be positive, got {}",
                self.area_per_visitor
            )));
        }
        if !self.management_factor.is_finite() || !(0.0..=1.0).contains(&self.management_factor) {
            return Err(CalculationError::Configuration(format!(
                "management factor must be within [0, 1], got {}",
                self.management_factor
            )));
        }
        Ok(())
    }
}

/// Bottleneck of a segmented route, informational only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteGroupLimit {
    pub bottleneck_segment: usize,
    pub groups_per_day: f64,
    pub visitors_per_day: f64,
}

/// All figures computed for one object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectCapacity {
    pub object_id: i32,
    pub object_name: String,
    pub object_type: ObjectType,
    pub physical_size: PhysicalSize,
    pub parameters: ResolvedParameters,
    pub visitors_at_once: f64,
    pub return_factor: ReturnFactor,
    pub correction: Correction,
    pub base_capacity: f64,
    pub potential_capacity: f64,
    pub pdre_capacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_group_limit: Option<RouteGroupLimit>,
}

pub struct ObjectCapacityCalculator<'a, M: GeometryMetrics> {
    defaults: &'a CalculationDefaults,
    metrics: &'a M,
    return_factors: ReturnFactorCalculator,
}

impl<'a, M: GeometryMetrics> ObjectCapacityCalculator<'a, M> {
    pub fn new(defaults: &'a CalculationDefaults, metrics: &'a M) -> Self {
        Self {
            defaults,
            metrics,
            return_factors: ReturnFactorCalculator::new(defaults),
        }
    }

    /// Computes BCC, PCC and RCC for one object of area `area_id`
    pub fn calculate(
        &self,
        object: &ObjectInput,
        area_id: i32,
        factors: &[FactorInput],
    ) -> Result<ObjectCapacity, CalculationError> {
        let parameters = ResolvedParameters::resolve(object, self.defaults);
        parameters.validate()?;

        let physical_size = self.metrics.measure(object)?;
        let return_factor = self.return_factors.calculate(
            object.object_type,
            parameters.operating_hours,
            parameters.avg_visit_duration,
            &object.route_segments,
        )?;

        let visitors_at_once = physical_size.visitors_at_once(parameters.area_per_visitor);
        let base_capacity = visitors_at_once * return_factor.value;

        let correction = CorrectionFactorResolver::resolve(object, area_id, factors);
        let potential_capacity = base_capacity * correction.value;

        let pdre_capacity = potential_capacity * parameters.management_factor;

        let route_group_limit = route_group_limit(&return_factor, parameters.avg_group_size);

        tracing::debug!(
            object_id = object.id,
            base = base_capacity,
            potential = potential_capacity,
            pdre = pdre_capacity,
            "Object capacity computed"
        );

        Ok(ObjectCapacity {
            object_id: object.id,
            object_name: object.name.clone(),
            object_type: object.object_type,
            physical_size,
            parameters,
            visitors_at_once,
            return_factor,
            correction,
            base_capacity,
            potential_capacity,
            pdre_capacity,
            route_group_limit,
        })
    }
}

fn route_group_limit(return_factor: &ReturnFactor, group_size: f64) -> Option<RouteGroupLimit> {
    if !group_size.is_finite() || group_size <= 0.0 {
        return None;
    }
    return_factor
        .segments
        .iter()
        .filter_map(|s| s.max_groups_per_day.map(|g| (s.index, g)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, groups)| RouteGroupLimit {
            bottleneck_segment: index,
            groups_per_day: groups,
            visitors_per_day: groups * group_size,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{fixtures, geometry::MockGeometryMetrics, RouteSegment, StoredMetrics};
    use approx::assert_relative_eq;

    fn calculate(object: &ObjectInput, factors: &[FactorInput]) -> Result<ObjectCapacity, CalculationError> {
        let defaults = CalculationDefaults::default();
        ObjectCapacityCalculator::new(&defaults, &StoredMetrics).calculate(object, 1, factors)
    }

    #[test]
    fn test_linear_route_scenario() {
        let mut object = fixtures::linear_object(1, "Trail A", 5.2);
        object.parameters.management_factor = Some(0.8);
        let factors = vec![fixtures::factor(10, 0.8)];

        let capacity = calculate(&object, &factors).unwrap();
        assert_relative_eq!(capacity.return_factor.value, 4.0);
        assert_relative_eq!(capacity.visitors_at_once, 520.0, max_relative = 1e-12);
        assert_relative_eq!(capacity.base_capacity, 2080.0, max_relative = 1e-12);
        assert_relative_eq!(capacity.potential_capacity, 1664.0, max_relative = 1e-12);
        assert_relative_eq!(capacity.pdre_capacity, 1331.2, max_relative = 1e-12);
    }

    #[test]
    fn test_areal_object() {
        let object = fixtures::areal_object(2, "Meadow", 2000.0);
        let capacity = calculate(&object, &[]).unwrap();
        // 2000 / 10 * (8 / 2)
        assert_relative_eq!(capacity.base_capacity, 800.0);
        assert_eq!(capacity.potential_capacity, capacity.base_capacity);
        assert_eq!(capacity.pdre_capacity, capacity.potential_capacity);
    }

    #[test]
    fn test_management_factor_zero() {
        let mut object = fixtures::areal_object(2, "Meadow", 2000.0);
        object.parameters.management_factor = Some(0.0);
        assert_eq!(calculate(&object, &[]).unwrap().pdre_capacity, 0.0);
    }

    #[test]
    fn test_defaults_fill_missing_parameters() {
        let mut object = fixtures::areal_object(2, "Meadow", 2000.0);
        object.parameters = Default::default();
        let capacity = calculate(&object, &[]).unwrap();
        assert_eq!(capacity.parameters.from_defaults.len(), 5);
        // 2000 / 10 * 4 * 0.8
        assert_relative_eq!(capacity.pdre_capacity, 640.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_parameters_are_configuration_errors() {
        let mut object = fixtures::areal_object(2, "Meadow", 2000.0);
        object.parameters.area_per_visitor = Some(0.0);
        assert!(matches!(calculate(&object, &[]), Err(CalculationError::Configuration(_))));

        object.parameters.area_per_visitor = Some(10.0);
        object.parameters.management_factor = Some(1.2);
        assert!(matches!(calculate(&object, &[]), Err(CalculationError::Configuration(_))));

        object.parameters.management_factor = Some(0.5);
        object.parameters.avg_visit_duration = Some(0.0);
        assert!(matches!(calculate(&object, &[]), Err(CalculationError::Configuration(_))));
    }

    #[test]
    fn test_unmeasurable_geometry_is_reported() {
        let defaults = CalculationDefaults::default();
        let mut metrics = MockGeometryMetrics::new();
        metrics
            .expect_measure()
            .returning(|_| Err(CalculationError::Geometry("self-intersecting".into())));

        let object = fixtures::areal_object(2, "Meadow", 2000.0);
        let result = ObjectCapacityCalculator::new(&defaults, &metrics).calculate(&object, 1, &[]);
        assert!(matches!(result, Err(CalculationError::Geometry(_))));
    }

    #[test]
    fn test_route_bottleneck() {
        let mut object = fixtures::linear_object(3, "Ridge", 4.0);
        object.route_segments = vec![
            RouteSegment {
                length_km: 3.0,
                optimal_distance_km: Some(0.5),
                travel_time_hours: Some(1.0),
                avg_speed_kmh: Some(3.0),
            },
            RouteSegment {
                length_km: 1.0,
                optimal_distance_km: Some(1.0),
                travel_time_hours: Some(1.0),
                avg_speed_kmh: Some(3.0),
            },
        ];

        let capacity = calculate(&object, &[]).unwrap();
        assert_relative_eq!(capacity.return_factor.value, 4.0);
        let limit = capacity.route_group_limit.unwrap();
        assert_eq!(limit.bottleneck_segment, 1);
        // 1 + 3 * 7 / 1 = 22 groups of 3
        assert_relative_eq!(limit.groups_per_day, 22.0);
        assert_relative_eq!(limit.visitors_per_day, 66.0);
    }

    #[test]
    fn test_capacities_are_ordered() {
        let mut object = fixtures::areal_object(2, "Meadow", 12_345.0);
        object.correction_factors.insert("cf".into(), 0.37);
        object.parameters.management_factor = Some(0.61);
        let c = calculate(&object, &[fixtures::factor(1, 0.9)]).unwrap();
        assert!(0.0 <= c.pdre_capacity);
        assert!(c.pdre_capacity <= c.potential_capacity);
        assert!(c.potential_capacity <= c.base_capacity);
    }
}
