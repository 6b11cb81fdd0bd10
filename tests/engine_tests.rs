//! Engine scenarios exercised through the public API

use approx::assert_relative_eq;
use indexmap::IndexMap;

use pdre_server::{
    config::CalculationDefaults,
    engine::{
        AreaInput, CalculationOrchestrator, CalculationRun, FactorInput, GeometryMetrics,
        ObjectCapacityCalculator, ObjectInput, PhysicalSize, RouteSegment, StoredMetrics,
        VisitParameters,
    },
    error::CalculationError,
    models::enums::{CalculationPeriod, CalculationStatus, FactorType, ObjectType},
};

fn area() -> AreaInput {
    AreaInput {
        id: 7,
        name: "Valdai".to_string(),
        has_boundary: true,
        area_ha: Some(158_500.0),
    }
}

fn trail(id: i32, name: &str, length_km: f64) -> ObjectInput {
    ObjectInput {
        id,
        name: name.to_string(),
        object_type: ObjectType::Linear,
        is_active: true,
        has_geometry: true,
        length_km: Some(length_km),
        area_sq_m: None,
        parameters: VisitParameters::default(),
        correction_factors: IndexMap::new(),
        route_segments: Vec::new(),
        intersecting_zone_ids: Vec::new(),
    }
}

fn site(id: i32, name: &str, area_sq_m: f64) -> ObjectInput {
    ObjectInput {
        object_type: ObjectType::Areal,
        length_km: None,
        area_sq_m: Some(area_sq_m),
        ..trail(id, name, 0.0)
    }
}

fn factor(id: i32, coefficient: f64) -> FactorInput {
    FactorInput {
        id,
        name: format!("factor {}", id),
        factor_type: FactorType::Ecological,
        coefficient,
        apply_to_all: true,
        area_ids: Vec::new(),
        has_zone: false,
    }
}

#[test]
fn test_reference_trail_from_defaults() {
    // 5.2 km at 10 m per visitor, 8 h over 2 h visits, one 0.8 factor, management 0.8
    let defaults = CalculationDefaults::default();
    let calculator = ObjectCapacityCalculator::new(&defaults, &StoredMetrics);

    let capacity = calculator
        .calculate(&trail(1, "Lake trail", 5.2), 7, &[factor(1, 0.8)])
        .unwrap();

    assert_relative_eq!(capacity.visitors_at_once, 520.0, max_relative = 1e-12);
    assert_relative_eq!(capacity.return_factor.value, 4.0);
    assert_relative_eq!(capacity.base_capacity, 2080.0, max_relative = 1e-12);
    assert_relative_eq!(capacity.potential_capacity, 1664.0, max_relative = 1e-12);
    assert_relative_eq!(capacity.pdre_capacity, 1331.2, max_relative = 1e-12);
    assert_eq!(capacity.parameters.from_defaults.len(), 5);
}

#[test]
fn test_capacities_never_expand() {
    let defaults = CalculationDefaults::default();
    let calculator = ObjectCapacityCalculator::new(&defaults, &StoredMetrics);
    let factors = [factor(1, 0.9), factor(2, 0.35)];

    let mut objects = vec![
        trail(1, "Short", 0.4),
        trail(2, "Long", 42.0),
        site(3, "Meadow", 12_000.0),
        site(4, "Empty", 0.0),
    ];
    objects[1].parameters.management_factor = Some(0.0);
    objects[2].correction_factors.insert("cf_soil".into(), 0.6);

    for object in &objects {
        let c = calculator.calculate(object, 7, &factors).unwrap();
        assert!(c.base_capacity >= 0.0);
        assert!(c.potential_capacity <= c.base_capacity);
        assert!(c.pdre_capacity <= c.potential_capacity);
        assert!(c.correction.value >= 0.0 && c.correction.value <= 1.0);
    }
}

#[test]
fn test_segmented_route_uses_travel_time() {
    let defaults = CalculationDefaults::default();
    let calculator = ObjectCapacityCalculator::new(&defaults, &StoredMetrics);

    let mut route = trail(1, "Ridge", 4.0);
    route.parameters.operating_hours = Some(8.0);
    route.route_segments = vec![
        RouteSegment {
            length_km: 2.0,
            optimal_distance_km: None,
            travel_time_hours: Some(0.5),
            avg_speed_kmh: None,
        },
        RouteSegment {
            length_km: 2.0,
            optimal_distance_km: None,
            travel_time_hours: None,
            avg_speed_kmh: Some(4.0),
        },
    ];

    let capacity = calculator.calculate(&route, 7, &[]).unwrap();
    assert_relative_eq!(capacity.return_factor.total_travel_time(), 1.0);
    assert_relative_eq!(capacity.return_factor.value, 8.0);
    assert_relative_eq!(capacity.base_capacity, 400.0 * 8.0, max_relative = 1e-12);
}

#[test]
fn test_route_group_limit_reports_bottleneck() {
    let defaults = CalculationDefaults::default();
    let calculator = ObjectCapacityCalculator::new(&defaults, &StoredMetrics);

    let mut route = trail(1, "Canyon", 6.0);
    route.parameters.avg_group_size = Some(5.0);
    route.route_segments = vec![
        RouteSegment {
            length_km: 3.0,
            optimal_distance_km: Some(0.5),
            travel_time_hours: None,
            avg_speed_kmh: None,
        },
        RouteSegment {
            length_km: 3.0,
            optimal_distance_km: Some(1.0),
            travel_time_hours: None,
            avg_speed_kmh: None,
        },
    ];

    // 1 h per segment at 3 km/h: 1 + 3·7/0.5 = 43 and 1 + 3·7/1 = 22 groups
    let capacity = calculator.calculate(&route, 7, &[]).unwrap();
    let limit = capacity.route_group_limit.unwrap();
    assert_eq!(limit.bottleneck_segment, 1);
    assert_relative_eq!(limit.groups_per_day, 22.0, max_relative = 1e-12);
    assert_relative_eq!(limit.visitors_per_day, 110.0, max_relative = 1e-12);
}

#[test]
fn test_zoned_factor_only_reaches_intersecting_objects() {
    let defaults = CalculationDefaults::default();
    let orchestrator = CalculationOrchestrator::new(&defaults, &StoredMetrics);

    let mut zoned = factor(9, 0.5);
    zoned.has_zone = true;

    let mut inside = site(1, "Nesting colony", 1000.0);
    inside.intersecting_zone_ids = vec![9];
    let outside = site(2, "Beach", 1000.0);

    let calculation = orchestrator
        .calculate_area(&area(), &[inside, outside], &[zoned], CalculationPeriod::Day)
        .unwrap();

    // 100 visitors × 4 turnovers × 0.8 management, halved inside the zone
    assert_relative_eq!(calculation.totals.breakdown["Nesting colony"], 160.0, max_relative = 1e-12);
    assert_relative_eq!(calculation.totals.breakdown["Beach"], 320.0, max_relative = 1e-12);
    assert_relative_eq!(calculation.total(), 480.0, max_relative = 1e-12);
}

#[test]
fn test_factor_scoped_to_other_area_is_ignored() {
    let defaults = CalculationDefaults::default();
    let calculator = ObjectCapacityCalculator::new(&defaults, &StoredMetrics);

    let mut scoped = factor(3, 0.1);
    scoped.apply_to_all = false;
    scoped.area_ids = vec![99];

    let capacity = calculator.calculate(&site(1, "Camp", 500.0), 7, &[scoped]).unwrap();
    assert_eq!(capacity.correction.value, 1.0);
    assert!(capacity.correction.applied.is_empty());
}

#[test]
fn test_area_run_with_duplicate_names_and_period() {
    let defaults = CalculationDefaults::default();
    let orchestrator = CalculationOrchestrator::new(&defaults, &StoredMetrics);
    let objects = [
        site(1, "Viewpoint", 500.0),
        site(2, "Viewpoint", 500.0),
        site(3, "Viewpoint", 500.0),
    ];

    let mut run = CalculationRun::new(7, CalculationPeriod::Week);
    let calculation = orchestrator.execute(&mut run, &area(), &objects, &[]).unwrap();

    assert_eq!(run.status(), CalculationStatus::Completed);
    let keys: Vec<&str> = calculation.totals.breakdown.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Viewpoint", "Viewpoint (2)", "Viewpoint (3)"]);
    assert_relative_eq!(calculation.total(), 3.0 * 160.0, max_relative = 1e-12);
    assert_relative_eq!(calculation.period_total(), 7.0 * 480.0, max_relative = 1e-12);
}

#[test]
fn test_total_equals_sum_of_breakdown() {
    let defaults = CalculationDefaults::default();
    let orchestrator = CalculationOrchestrator::new(&defaults, &StoredMetrics);
    let objects: Vec<ObjectInput> = (1..=12)
        .map(|i| trail(i, &format!("Trail {}", i % 4), f64::from(i) * 0.75))
        .collect();

    let calculation = orchestrator
        .calculate_area(&area(), &objects, &[factor(1, 0.7)], CalculationPeriod::Month)
        .unwrap();

    let sum: f64 = calculation.totals.breakdown.values().sum();
    assert_eq!(calculation.totals.breakdown.len(), 12);
    assert_relative_eq!(calculation.total(), sum, max_relative = 1e-9);
}

/// Reports every object as 1 km or 1000 m² regardless of stored values
struct FixedMetrics;

impl GeometryMetrics for FixedMetrics {
    fn measure(&self, object: &ObjectInput) -> Result<PhysicalSize, CalculationError> {
        match object.object_type {
            ObjectType::Linear => Ok(PhysicalSize::LengthKm(1.0)),
            _ => Ok(PhysicalSize::AreaSqM(1000.0)),
        }
    }
}

#[test]
fn test_custom_metrics_collaborator() {
    let defaults = CalculationDefaults::default();
    let calculator = ObjectCapacityCalculator::new(&defaults, &FixedMetrics);

    let mut object = trail(1, "Unmeasured", 0.0);
    object.has_geometry = false;

    let capacity = calculator.calculate(&object, 7, &[]).unwrap();
    assert_relative_eq!(capacity.visitors_at_once, 100.0, max_relative = 1e-12);
}

#[test]
fn test_area_without_boundary_fails_whole_run() {
    let defaults = CalculationDefaults::default();
    let orchestrator = CalculationOrchestrator::new(&defaults, &StoredMetrics);
    let mut area = area();
    area.area_ha = Some(0.0);

    let mut run = CalculationRun::new(area.id, CalculationPeriod::Month);
    let result = orchestrator.execute(&mut run, &area, &[site(1, "Camp", 100.0)], &[]);

    assert!(matches!(result, Err(CalculationError::Geometry(_))));
    assert_eq!(run.status(), CalculationStatus::Failed);
}
