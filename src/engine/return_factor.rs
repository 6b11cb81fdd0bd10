//! Return factor: visitor turnovers per operating day

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{config::CalculationDefaults, error::CalculationError, models::enums::ObjectType};

/// One leg of a linear route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RouteSegment {
    pub length_km: f64,
    /// Comfortable distance between consecutive groups, km
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_speed_kmh: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnFactorSource {
    VisitDuration,
    RouteSegments,
}

/// Timing of a route segment as used in the calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentTiming {
    pub index: usize,
    pub length_km: f64,
    pub travel_time_hours: f64,
    pub speed_kmh: f64,
    /// True when the travel time was derived from length and speed
    pub derived: bool,
    /// Groups per day the segment admits at the optimal spacing, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_groups_per_day: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnFactor {
    pub value: f64,
    pub source: ReturnFactorSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<SegmentTiming>,
}

impl ReturnFactor {
    pub fn total_travel_time(&self) -> f64 {
        self.segments.iter().map(|s| s.travel_time_hours).sum()
    }
}

#[derive(Debug, Clone)]
pub struct ReturnFactorCalculator {
    default_speed_kmh: f64,
}

impl ReturnFactorCalculator {
    pub fn new(defaults: &CalculationDefaults) -> Self {
        Self {
            default_speed_kmh: defaults.avg_speed_kmh,
        }
    }

    /// Linear objects with segment detail turn over once per full traversal;
    /// everything else once per average visit.
    pub fn calculate(
        &self,
        object_type: ObjectType,
        operating_hours: f64,
        avg_visit_duration: f64,
        segments: &[RouteSegment],
    ) -> Result<ReturnFactor, CalculationError> {
        if object_type == ObjectType::Linear && !segments.is_empty() {
            self.for_route(operating_hours, segments)
        } else {
            self.for_visit(operating_hours, avg_visit_duration)
        }
    }

    pub fn for_visit(
        &self,
        operating_hours: f64,
        avg_visit_duration: f64,
    ) -> Result<ReturnFactor, CalculationError> {
        check_operating_hours(operating_hours)?;
        if !avg_visit_duration.is_finite() || avg_visit_duration <= 0.0 {
            return Err(CalculationError::Configuration(format!(
                "average visit duration must be positive, got {}",
                avg_visit_duration
            )));
        }

        Ok(ReturnFactor {
            value: operating_hours / avg_visit_duration,
            source: ReturnFactorSource::VisitDuration,
            segments: Vec::new(),
        })
    }

    pub fn for_route(
        &self,
        operating_hours: f64,
        segments: &[RouteSegment],
    ) -> Result<ReturnFactor, CalculationError> {
        check_operating_hours(operating_hours)?;

        let timings = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| self.segment_timing(index, segment, operating_hours))
            .collect::<Result<Vec<_>, _>>()?;

        let total: f64 = timings.iter().map(|t| t.travel_time_hours).sum();
        if total <= 0.0 {
            return Err(CalculationError::Configuration(
                "total route travel time must be positive".to_string(),
            ));
        }

        Ok(ReturnFactor {
            value: operating_hours / total,
            source: ReturnFactorSource::RouteSegments,
            segments: timings,
        })
    }

    fn segment_timing(
        &self,
        index: usize,
        segment: &RouteSegment,
        operating_hours: f64,
    ) -> Result<SegmentTiming, CalculationError> {
        if !segment.length_km.is_finite() || segment.length_km < 0.0 {
            return Err(CalculationError::Configuration(format!(
                "segment {} has invalid length {}",
                index, segment.length_km
            )));
        }

        let speed = segment.avg_speed_kmh.unwrap_or(self.default_speed_kmh);

        let (travel_time, derived) = match segment.travel_time_hours {
            Some(t) if t.is_finite() && t >= 0.0 => (t, false),
            Some(t) => {
                return Err(CalculationError::Configuration(format!(
                    "segment {} has invalid travel time {}",
                    index, t
                )))
            }
            None => {
                if !speed.is_finite() || speed <= 0.0 {
                    return Err(CalculationError::Configuration(format!(
                        "segment {} has no travel time and no usable speed",
                        index
                    )));
                }
                (segment.length_km / speed, true)
            }
        };

        Ok(SegmentTiming {
            index,
            length_km: segment.length_km,
            travel_time_hours: travel_time,
            speed_kmh: speed,
            derived,
            max_groups_per_day: max_groups_per_day(
                speed,
                operating_hours,
                travel_time,
                segment.optimal_distance_km,
            ),
        })
    }
}

fn check_operating_hours(hours: f64) -> Result<(), CalculationError> {
    if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
        return Err(CalculationError::Configuration(format!(
            "operating hours must be within [0, 24], got {}",
            hours
        )));
    }
    Ok(())
}

/// Groups entering a segment per day when spaced `distance` km apart:
/// `1 + v·(T − t)/d`, never negative.
fn max_groups_per_day(
    speed_kmh: f64,
    operating_hours: f64,
    travel_time_hours: f64,
    distance_km: Option<f64>,
) -> Option<f64> {
    let d = distance_km.filter(|d| d.is_finite() && *d > 0.0)?;
    if travel_time_hours <= 0.0 || !speed_kmh.is_finite() || speed_kmh <= 0.0 {
        return None;
    }
    Some((1.0 + speed_kmh * (operating_hours - travel_time_hours) / d).max(0.0))
}
