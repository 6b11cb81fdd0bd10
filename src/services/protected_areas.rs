//! Protected areas service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        calculation_result::CalculationResult,
        protected_area::{CreateProtectedArea, ProtectedArea, UpdateProtectedArea},
        tourism_object::TourismObject,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ProtectedAreasService {
    repository: Repository,
}

impl ProtectedAreasService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<ProtectedArea>> {
        self.repository.protected_areas.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ProtectedArea> {
        self.repository.protected_areas.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateProtectedArea) -> AppResult<ProtectedArea> {
        data.validate()?;
        let area = self.repository.protected_areas.create(data).await?;
        tracing::info!(area_id = area.id, area_ha = ?area.area_ha, "Protected area created");
        Ok(area)
    }

    pub async fn update(&self, id: i32, data: &UpdateProtectedArea) -> AppResult<ProtectedArea> {
        data.validate()?;
        self.repository.protected_areas.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.protected_areas.delete(id).await
    }

    /// Active tourism objects of an area
    pub async fn active_objects(&self, id: i32) -> AppResult<Vec<TourismObject>> {
        self.repository.protected_areas.get_by_id(id).await?;
        self.repository.tourism_objects.list_active(id).await
    }

    /// Calculation history of an area, newest first
    pub async fn calculations(&self, id: i32) -> AppResult<Vec<CalculationResult>> {
        self.repository.protected_areas.get_by_id(id).await?;
        self.repository.calculations.list_for_area(id).await
    }
}
