//! Business logic services

pub mod calculation;
pub mod limiting_factors;
pub mod protected_areas;
pub mod redis;
pub mod tourism_objects;

use crate::{config::CalculationConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub protected_areas: protected_areas::ProtectedAreasService,
    pub tourism_objects: tourism_objects::TourismObjectsService,
    pub limiting_factors: limiting_factors::LimitingFactorsService,
    pub calculation: calculation::CalculationService,
    pub redis: redis::RedisService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub async fn new(
        repository: Repository,
        calculation_config: CalculationConfig,
        redis_service: redis::RedisService,
    ) -> AppResult<Self> {
        Ok(Self {
            protected_areas: protected_areas::ProtectedAreasService::new(repository.clone()),
            tourism_objects: tourism_objects::TourismObjectsService::new(
                repository.clone(),
                calculation_config.clone(),
            ),
            limiting_factors: limiting_factors::LimitingFactorsService::new(repository.clone()),
            calculation: calculation::CalculationService::new(
                repository.clone(),
                redis_service.clone(),
                calculation_config,
            ),
            redis: redis_service,
            repository,
        })
    }

    /// Database and Redis round-trips for the readiness check
    pub async fn check_ready(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        self.redis.ping().await
    }
}
