//! Area calculation runs
//!
//! A run is recorded as `pending` before the request returns, then computed
//! on a background task. The per-area Redis lock (when enabled) is held from
//! the request until the task has written its final state.

use std::future::Future;

use serde_json::json;

use crate::{
    config::CalculationConfig,
    engine::{
        AreaCalculation, CalculationOrchestrator, CalculationRun, FactorInput, ObjectInput,
        StoredMetrics,
    },
    error::{AppError, AppResult},
    models::{
        calculation_result::{CalculationRequest, CalculationResult, QuickCalculation},
        enums::CalculationPeriod,
    },
    repository::Repository,
};

use super::redis::{AreaLock, RedisService};

#[derive(Clone)]
pub struct CalculationService {
    repository: Repository,
    redis: RedisService,
    config: CalculationConfig,
}

impl CalculationService {
    pub fn new(repository: Repository, redis: RedisService, config: CalculationConfig) -> Self {
        Self {
            repository,
            redis,
            config,
        }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CalculationResult> {
        self.repository.calculations.get_by_id(id).await
    }

    /// Record a pending run for an area and compute it in the background
    pub async fn start(&self, area_id: i32, request: &CalculationRequest) -> AppResult<CalculationResult> {
        self.repository.protected_areas.get_by_id(area_id).await?;
        let period = request.calculation_period.unwrap_or_default();

        let lock = self.acquire_lock(area_id).await?;

        let input_parameters = json!({
            "calculation_period": period,
            "period_days": period.days(),
            "method": self.config.method,
            "defaults": self.config.defaults,
        });

        let pending = match self
            .repository
            .calculations
            .create_pending(area_id, period, &input_parameters)
            .await
        {
            Ok(pending) => pending,
            Err(e) => {
                self.release_lock(lock).await;
                return Err(e);
            }
        };

        tracing::info!(
            calculation_id = pending.id,
            area_id,
            period = %period,
            "Calculation queued"
        );

        let service = self.clone();
        let calculation_id = pending.id;
        tokio::spawn(async move {
            if let Err(e) = service.execute(calculation_id, area_id, period).await {
                tracing::warn!(calculation_id, area_id, "Background calculation ended with error: {}", e);
            }
            service.release_lock(lock).await;
        });

        Ok(pending)
    }

    /// Drive a pending result to its final state.
    ///
    /// Any failure, including a run that cannot leave `pending`, ends in `failed`.
    pub async fn execute(
        &self,
        calculation_id: i32,
        area_id: i32,
        period: CalculationPeriod,
    ) -> AppResult<CalculationResult> {
        let stages = async {
            self.repository.calculations.mark_processing(calculation_id).await?;
            let calculation = self.compute(area_id, period).await?;
            self.repository
                .calculations
                .complete(calculation_id, &self.config.method, &calculation)
                .await
        };

        let outcome = record_failure(stages, move |message| async move {
            self.repository.calculations.fail(calculation_id, &message).await
        })
        .await;

        match &outcome {
            Ok(result) => tracing::info!(
                calculation_id,
                area_id,
                total_pdre = ?result.total_pdre,
                "Calculation completed"
            ),
            Err(e) => tracing::error!(calculation_id, area_id, "Calculation failed: {}", e),
        }
        outcome
    }

    /// Compute an area synchronously without recording a result or touching
    /// stored capacities
    pub async fn quick_calculate(
        &self,
        area_id: i32,
        request: &CalculationRequest,
    ) -> AppResult<QuickCalculation> {
        let period = request.calculation_period.unwrap_or_default();
        let calculation = self.compute(area_id, period).await?;

        tracing::info!(
            area_id,
            total_pdre = calculation.total(),
            skipped = calculation.skipped.len(),
            "Quick calculation done"
        );
        QuickCalculation::try_from(&calculation)
    }

    async fn compute(&self, area_id: i32, period: CalculationPeriod) -> AppResult<AreaCalculation> {
        let area = self.repository.protected_areas.get_by_id(area_id).await?;
        let objects: Vec<ObjectInput> = self
            .repository
            .tourism_objects
            .list_calculation_inputs(area_id)
            .await?
            .iter()
            .map(|o| o.to_input())
            .collect();
        let factors: Vec<FactorInput> = self
            .repository
            .limiting_factors
            .list_for_area(area_id)
            .await?
            .iter()
            .map(|f| f.to_input())
            .collect();

        let orchestrator = CalculationOrchestrator::new(&self.config.defaults, &StoredMetrics);
        let mut run = CalculationRun::new(area_id, period);
        let calculation = orchestrator.execute(&mut run, &area.to_input(), &objects, &factors)?;
        Ok(calculation)
    }

    async fn acquire_lock(&self, area_id: i32) -> AppResult<Option<AreaLock>> {
        if !self.config.serialize_runs {
            return Ok(None);
        }
        match self
            .redis
            .try_lock_area(area_id, self.config.lock_ttl_seconds)
            .await?
        {
            Some(lock) => Ok(Some(lock)),
            None => Err(AppError::Conflict(format!(
                "A calculation is already running for protected area {}",
                area_id
            ))),
        }
    }

    async fn release_lock(&self, lock: Option<AreaLock>) {
        let Some(lock) = lock else { return };
        match self.redis.release_area_lock(&lock).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(area_id = lock.area_id, "Calculation lock expired before release"),
            Err(e) => tracing::error!(area_id = lock.area_id, "Failed to release calculation lock: {}", e),
        }
    }
}

/// Awaits `stages`; on error hands the message to `on_failure` before returning it
async fn record_failure<T, S, F, R>(stages: S, on_failure: F) -> AppResult<T>
where
    S: Future<Output = AppResult<T>>,
    F: FnOnce(String) -> R,
    R: Future<Output = AppResult<()>>,
{
    let outcome = stages.await;
    if let Err(e) = &outcome {
        if let Err(record_err) = on_failure(e.to_string()).await {
            tracing::error!("Failed to record calculation failure: {}", record_err);
        }
    }
    outcome
}
