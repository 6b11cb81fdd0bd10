//! Combined correction from limiting factors and object coefficients

use indexmap::IndexMap;
use serde::Serialize;

use super::{FactorInput, ObjectInput};
use crate::{error::CalculationError, models::enums::FactorType};

/// Multiplicative attenuation coefficient in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Coefficient(f64);

impl Coefficient {
    pub const ONE: Coefficient = Coefficient(1.0);

    pub fn new(value: f64) -> Result<Self, CalculationError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CalculationError::Configuration(format!(
                "coefficient {} is outside [0, 1]",
                value
            )))
        }
    }

    /// Clamps into [0, 1]; the flag reports whether the value was changed.
    /// NaN becomes 1.0 (no attenuation).
    pub fn clamped(value: f64) -> (Self, bool) {
        match Self::new(value) {
            Ok(c) => (c, false),
            Err(_) if value.is_nan() => (Self::ONE, true),
            Err(_) => (Self(value.clamp(0.0, 1.0)), true),
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Validated mapping of named correction coefficients
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CorrectionFactors(IndexMap<String, Coefficient>);

impl CorrectionFactors {
    /// Rejects the whole mapping if any value is outside [0, 1]
    pub fn try_from_raw(raw: &IndexMap<String, f64>) -> Result<Self, CalculationError> {
        raw.iter()
            .map(|(name, v)| {
                Coefficient::new(*v)
                    .map(|c| (name.clone(), c))
                    .map_err(|_| {
                        CalculationError::Configuration(format!(
                            "correction factor '{}' = {} is outside [0, 1]",
                            name, v
                        ))
                    })
            })
            .collect::<Result<IndexMap<_, _>, _>>()
            .map(Self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coefficient)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn product(&self) -> f64 {
        self.0.values().map(Coefficient::value).product()
    }

    pub fn into_raw(self) -> IndexMap<String, f64> {
        self.0.into_iter().map(|(k, v)| (k, v.value())).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FactorOrigin {
    /// Coefficient stored on the object itself
    Object,
    LimitingFactor { factor_id: i32, factor_type: FactorType },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFactor {
    #[serde(flatten)]
    pub origin: FactorOrigin,
    pub name: String,
    pub coefficient: f64,
    /// Stored value before clamping, when it was out of range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clamped_from: Option<f64>,
}

/// Result of correction resolution for one object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correction {
    pub value: f64,
    pub applied: Vec<AppliedFactor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Correction {
    pub fn none() -> Self {
        Self {
            value: 1.0,
            applied: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub struct CorrectionFactorResolver;

impl CorrectionFactorResolver {
    /// Limiting factors of the area that reach the object
    pub fn applicable<'a>(
        object: &'a ObjectInput,
        area_id: i32,
        factors: &'a [FactorInput],
    ) -> impl Iterator<Item = &'a FactorInput> + 'a {
        factors
            .iter()
            .filter(move |f| f.applies_to_area(area_id) && f.reaches(object))
    }

    /// Product of the object's own coefficients and every applicable limiting
    /// factor. Out-of-range stored values are clamped and reported as warnings.
    pub fn resolve(object: &ObjectInput, area_id: i32, factors: &[FactorInput]) -> Correction {
        let mut correction = Correction::none();

        let object_factors = object
            .correction_factors
            .iter()
            .map(|(name, v)| (FactorOrigin::Object, name.as_str(), *v));
        let limiting = Self::applicable(object, area_id, factors).map(|f| {
            (
                FactorOrigin::LimitingFactor {
                    factor_id: f.id,
                    factor_type: f.factor_type,
                },
                f.name.as_str(),
                f.coefficient,
            )
        });

        for (origin, name, raw) in object_factors.chain(limiting) {
            let (coefficient, was_clamped) = Coefficient::clamped(raw);
            if was_clamped {
                tracing::warn!(
                    object_id = object.id,
                    factor = name,
                    "Correction coefficient {} clamped to {}",
                    raw,
                    coefficient.value()
                );
                correction.warnings.push(format!(
                    "coefficient '{}' = {} clamped to {}",
                    name,
                    raw,
                    coefficient.value()
                ));
            }
            correction.value *= coefficient.value();
            correction.applied.push(AppliedFactor {
                origin,
                name: name.to_string(),
                coefficient: coefficient.value(),
                clamped_from: was_clamped.then_some(raw),
            });
        }

        correction
    }
}
