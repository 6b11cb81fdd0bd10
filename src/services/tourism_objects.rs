//! Tourism objects service

use validator::Validate;

use crate::{
    config::CalculationConfig,
    engine::{CorrectionFactors, FactorInput, ObjectCapacityCalculator, StoredMetrics},
    error::{AppError, AppResult},
    models::tourism_object::{
        ComputedCapacity, CreateTourismObject, RecalculatedObject, TourismObject, UpdateTourismObject,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TourismObjectsService {
    repository: Repository,
    config: CalculationConfig,
}

impl TourismObjectsService {
    pub fn new(repository: Repository, config: CalculationConfig) -> Self {
        Self { repository, config }
    }

    pub async fn list(&self, protected_area_id: Option<i32>) -> AppResult<Vec<TourismObject>> {
        self.repository.tourism_objects.list(protected_area_id).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<TourismObject> {
        self.repository.tourism_objects.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateTourismObject) -> AppResult<TourismObject> {
        data.validate()?;
        if let Some(ref factors) = data.correction_factors {
            check_correction_factors(factors)?;
        }
        self.repository
            .protected_areas
            .get_by_id(data.protected_area_id)
            .await?;

        let object = self.repository.tourism_objects.create(data).await?;
        tracing::info!(
            object_id = object.id,
            area_id = object.protected_area_id,
            object_type = %object.object_type,
            "Tourism object created"
        );
        Ok(object)
    }

    pub async fn update(&self, id: i32, data: &UpdateTourismObject) -> AppResult<TourismObject> {
        data.validate()?;
        if let Some(ref factors) = data.correction_factors {
            check_correction_factors(factors)?;
        }
        self.repository.tourism_objects.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.tourism_objects.delete(id).await
    }

    /// Recompute one object with the current factors and persist its capacities.
    ///
    /// Unlike an area run this does not record a calculation result, and a
    /// calculation error is returned to the caller instead of being skipped.
    pub async fn recalculate(&self, id: i32) -> AppResult<RecalculatedObject> {
        let object = self.repository.tourism_objects.get_calculation_input(id).await?;
        let factors: Vec<FactorInput> = self
            .repository
            .limiting_factors
            .list_for_area(object.protected_area_id)
            .await?
            .iter()
            .map(|f| f.to_input())
            .collect();

        let calculator = ObjectCapacityCalculator::new(&self.config.defaults, &StoredMetrics);
        let capacity = calculator.calculate(&object.to_input(), object.protected_area_id, &factors)?;

        self.repository
            .tourism_objects
            .save_computed(&ComputedCapacity::from(&capacity))
            .await?;
        tracing::info!(object_id = id, pdre = capacity.pdre_capacity, "Tourism object recalculated");

        let object = self.repository.tourism_objects.get_by_id(id).await?;
        Ok(RecalculatedObject { object, capacity })
    }
}

fn check_correction_factors(raw: &indexmap::IndexMap<String, f64>) -> AppResult<()> {
    CorrectionFactors::try_from_raw(raw)
        .map(|_| ())
        .map_err(|e| AppError::Validation(format!("Invalid correction factors: {}", e)))
}
