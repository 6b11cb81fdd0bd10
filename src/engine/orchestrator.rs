//! Calculation runs over all active objects of a protected area

use serde::Serialize;

use super::{
    aggregate::{AreaAggregator, AreaTotals},
    capacity::{ObjectCapacity, ObjectCapacityCalculator},
    geometry::GeometryMetrics,
    AreaInput, FactorInput, ObjectInput,
};
use crate::{
    config::CalculationDefaults,
    error::CalculationError,
    models::enums::{CalculationPeriod, CalculationStatus},
};

/// In-memory state of one run: `pending → processing → {completed | failed}`
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRun {
    pub area_id: i32,
    pub period: CalculationPeriod,
    status: CalculationStatus,
    error_message: Option<String>,
}

impl CalculationRun {
    pub fn new(area_id: i32, period: CalculationPeriod) -> Self {
        Self {
            area_id,
            period,
            status: CalculationStatus::Pending,
            error_message: None,
        }
    }

    pub fn status(&self) -> CalculationStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn start(&mut self) -> Result<(), CalculationError> {
        self.transition(CalculationStatus::Processing)
    }

    pub fn complete(&mut self) -> Result<(), CalculationError> {
        self.transition(CalculationStatus::Completed)
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CalculationError> {
        self.transition(CalculationStatus::Failed)?;
        self.error_message = Some(message.into());
        Ok(())
    }

    fn transition(&mut self, next: CalculationStatus) -> Result<(), CalculationError> {
        if !self.status.can_transition_to(next) {
            return Err(CalculationError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::info!(area_id = self.area_id, from = %self.status, to = %next, "Calculation run transition");
        self.status = next;
        Ok(())
    }
}

/// An object excluded from the total because its calculation failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedObject {
    pub object_id: i32,
    pub object_name: String,
    /// Error marker, e.g. `configuration_error`
    pub error: &'static str,
    pub message: String,
}

/// A computed object and the breakdown key it was aggregated under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedObject {
    pub breakdown_key: String,
    #[serde(flatten)]
    pub capacity: ObjectCapacity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaCalculation {
    pub area_id: i32,
    pub area_name: String,
    pub area_ha: f64,
    pub period: CalculationPeriod,
    pub totals: AreaTotals,
    pub objects: Vec<ComputedObject>,
    pub skipped: Vec<SkippedObject>,
    pub active_objects: usize,
    pub notes: Vec<String>,
}

/// Audit payload stored on the calculation result
#[derive(Debug, Clone, Serialize)]
pub struct CalculationDetails<'a> {
    pub area_id: i32,
    pub area_name: &'a str,
    pub area_ha: f64,
    pub period: CalculationPeriod,
    pub period_days: u32,
    pub total_pdre: f64,
    pub period_total: f64,
    pub active_objects: usize,
    pub computed_objects: usize,
    pub objects: &'a [ComputedObject],
    pub skipped: &'a [SkippedObject],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub notes: &'a [String],
}

impl AreaCalculation {
    pub fn total(&self) -> f64 {
        self.totals.total
    }

    /// Total scaled to the run's period
    pub fn period_total(&self) -> f64 {
        self.totals.total * f64::from(self.period.days())
    }

    /// Ids of the objects left out of the total
    pub fn skipped_object_ids(&self) -> Vec<i32> {
        self.skipped.iter().map(|s| s.object_id).collect()
    }

    pub fn details(&self) -> CalculationDetails<'_> {
        CalculationDetails {
            area_id: self.area_id,
            area_name: &self.area_name,
            area_ha: self.area_ha,
            period: self.period,
            period_days: self.period.days(),
            total_pdre: self.total(),
            period_total: self.period_total(),
            active_objects: self.active_objects,
            computed_objects: self.objects.len(),
            objects: &self.objects,
            skipped: &self.skipped,
            notes: &self.notes,
        }
    }
}

pub struct CalculationOrchestrator<'a, M: GeometryMetrics> {
    calculator: ObjectCapacityCalculator<'a, M>,
}

impl<'a, M: GeometryMetrics> CalculationOrchestrator<'a, M> {
    pub fn new(defaults: &'a CalculationDefaults, metrics: &'a M) -> Self {
        Self {
            calculator: ObjectCapacityCalculator::new(defaults, metrics),
        }
    }

    /// Computes every active object in the given order and aggregates them.
    ///
    /// Object-level failures are recorded as skipped entries; only an area
    /// without a resolvable boundary fails the whole calculation.
    pub fn calculate_area(
        &self,
        area: &AreaInput,
        objects: &[ObjectInput],
        factors: &[FactorInput],
        period: CalculationPeriod,
    ) -> Result<AreaCalculation, CalculationError> {
        let area_ha = resolve_area(area)?;

        let mut aggregator = AreaAggregator::new();
        let mut computed = Vec::new();
        let mut skipped = Vec::new();
        let mut notes = Vec::new();

        let active: Vec<&ObjectInput> = objects.iter().filter(|o| o.is_active).collect();

        for object in &active {
            match self.calculator.calculate(object, area.id, factors) {
                Ok(capacity) => {
                    let breakdown_key = aggregator.add(&object.name, capacity.pdre_capacity);
                    if breakdown_key != object.name {
                        notes.push(format!(
                            "object {} listed as '{}' (duplicate name)",
                            object.id, breakdown_key
                        ));
                    }
                    computed.push(ComputedObject {
                        breakdown_key,
                        capacity,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        area_id = area.id,
                        object_id = object.id,
                        "Object skipped: {}",
                        e
                    );
                    skipped.push(SkippedObject {
                        object_id: object.id,
                        object_name: object.name.clone(),
                        error: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if active.is_empty() {
            let marker = CalculationError::Aggregation("area has no active tourism objects".to_string());
            notes.push(format!("{}: {}", marker.kind(), marker));
        }

        Ok(AreaCalculation {
            area_id: area.id,
            area_name: area.name.clone(),
            area_ha,
            period,
            totals: aggregator.finish(),
            objects: computed,
            skipped,
            active_objects: active.len(),
            notes,
        })
    }

    /// Drives `run` through its lifecycle around [`Self::calculate_area`]
    pub fn execute(
        &self,
        run: &mut CalculationRun,
        area: &AreaInput,
        objects: &[ObjectInput],
        factors: &[FactorInput],
    ) -> Result<AreaCalculation, CalculationError> {
        run.start()?;
        match self.calculate_area(area, objects, factors, run.period) {
            Ok(calculation) => {
                run.complete()?;
                Ok(calculation)
            }
            Err(e) => {
                tracing::error!(area_id = area.id, "Calculation failed: {}", e);
                run.fail(e.to_string())?;
                Err(e)
            }
        }
    }
}

fn resolve_area(area: &AreaInput) -> Result<f64, CalculationError> {
    if !area.has_boundary {
        return Err(CalculationError::Geometry(format!(
            "protected area '{}' has no boundary",
            area.name
        )));
    }
    match area.area_ha {
        Some(ha) if ha.is_finite() && ha > 0.0 => Ok(ha),
        _ => Err(CalculationError::Geometry(format!(
            "boundary of protected area '{}' could not be measured",
            area.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{fixtures, StoredMetrics};
    use approx::assert_relative_eq;

    fn run(objects: &[ObjectInput]) -> (CalculationRun, Result<AreaCalculation, CalculationError>) {
        let defaults = CalculationDefaults::default();
        let orchestrator = CalculationOrchestrator::new(&defaults, &StoredMetrics);
        let mut run = CalculationRun::new(1, CalculationPeriod::Month);
        let result = orchestrator.execute(&mut run, &fixtures::area(), objects, &[]);
        (run, result)
    }

    #[test]
    fn test_run_lifecycle_guards() {
        let mut run = CalculationRun::new(1, CalculationPeriod::Day);
        assert!(run.complete().is_err());
        run.start().unwrap();
        assert!(run.start().is_err());
        run.complete().unwrap();
        assert!(run.fail("late").is_err());
        assert_eq!(run.status(), CalculationStatus::Completed);
        assert_eq!(run.error_message(), None);
    }

    #[test]
    fn test_inactive_objects_never_contribute() {
        // 125 and 250 visitors at once, return factor 4 → 500 and 1000 per day at management 1.0
        let a = fixtures::areal_object(1, "A", 1250.0);
        let b = fixtures::areal_object(2, "B", 2500.0);
        let mut c = fixtures::areal_object(3, "C", 99_990.0);
        c.is_active = false;

        let (run, result) = run(&[a, b, c]);
        let calculation = result.unwrap();
        assert_eq!(run.status(), CalculationStatus::Completed);
        assert_relative_eq!(calculation.total(), 1500.0);
        assert_eq!(calculation.totals.breakdown.len(), 2);
        assert!(!calculation.totals.breakdown.contains_key("C"));
        assert_eq!(calculation.active_objects, 2);
    }

    #[test]
    fn test_empty_area_completes_with_zero() {
        let (run, result) = run(&[]);
        let calculation = result.unwrap();
        assert_eq!(run.status(), CalculationStatus::Completed);
        assert_eq!(calculation.total(), 0.0);
        assert!(calculation.totals.breakdown.is_empty());
        assert!(calculation.notes[0].starts_with("aggregation_error"));
    }

    #[test]
    fn test_broken_object_is_skipped() {
        let good = fixtures::areal_object(1, "Good", 1250.0);
        let mut broken = fixtures::areal_object(2, "Broken", 1000.0);
        broken.parameters.avg_visit_duration = Some(0.0);

        let (run, result) = run(&[good, broken]);
        let calculation = result.unwrap();
        assert_eq!(run.status(), CalculationStatus::Completed);
        assert_relative_eq!(calculation.total(), 500.0);
        assert_eq!(calculation.skipped.len(), 1);
        assert_eq!(calculation.skipped[0].object_id, 2);
        assert_eq!(calculation.skipped[0].error, "configuration_error");
        assert_eq!(calculation.skipped_object_ids(), vec![2]);
        assert!(calculation.objects.iter().all(|o| o.capacity.object_id != 2));
    }

    #[test]
    fn test_area_without_boundary_fails_run() {
        let defaults = CalculationDefaults::default();
        let orchestrator = CalculationOrchestrator::new(&defaults, &StoredMetrics);
        let mut area = fixtures::area();
        area.has_boundary = false;

        let mut run = CalculationRun::new(area.id, CalculationPeriod::Month);
        let result = orchestrator.execute(&mut run, &area, &[], &[]);
        assert!(matches!(result, Err(CalculationError::Geometry(_))));
        assert_eq!(run.status(), CalculationStatus::Failed);
        assert!(run.error_message().unwrap().contains("no boundary"));
    }

    #[test]
    fn test_details_payload() {
        let (_, result) = run(&[
            fixtures::areal_object(1, "Lake", 1250.0),
            fixtures::areal_object(2, "Lake", 1250.0),
        ]);
        let calculation = result.unwrap();
        let details = serde_json::to_value(calculation.details()).unwrap();

        assert_eq!(details["period"], "month");
        assert_eq!(details["period_days"], 30);
        assert_eq!(details["computed_objects"], 2);
        assert_eq!(details["objects"][1]["breakdown_key"], "Lake (2)");
        assert_eq!(details["objects"][0]["return_factor"]["source"], "visit_duration");
        assert_relative_eq!(details["period_total"].as_f64().unwrap(), 30_000.0);
    }
}
