//! Limiting factors service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        enums::FactorType,
        limiting_factor::{CreateLimitingFactor, LimitingFactor, UpdateLimitingFactor},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LimitingFactorsService {
    repository: Repository,
}

impl LimitingFactorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, factor_type: Option<FactorType>) -> AppResult<Vec<LimitingFactor>> {
        self.repository.limiting_factors.list(factor_type).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<LimitingFactor> {
        self.repository.limiting_factors.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateLimitingFactor) -> AppResult<LimitingFactor> {
        data.validate()?;
        let factor = self.repository.limiting_factors.create(data).await?;
        tracing::info!(
            factor_id = factor.id,
            factor_type = %factor.factor_type,
            coefficient = factor.coefficient_value,
            "Limiting factor created"
        );
        Ok(factor)
    }

    pub async fn update(&self, id: i32, data: &UpdateLimitingFactor) -> AppResult<LimitingFactor> {
        data.validate()?;
        self.repository.limiting_factors.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.limiting_factors.delete(id).await
    }
}
