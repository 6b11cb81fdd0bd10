//! Calculation results repository
//!
//! Results are append-only: rows move `pending → processing → completed|failed`
//! and a completed row is never written again (enforced by a trigger as well).

use sqlx::{Pool, Postgres};

use super::tourism_objects::{clear_computed, save_computed};
use crate::{
    engine::AreaCalculation,
    error::{AppError, AppResult},
    models::{
        calculation_result::CalculationResult,
        enums::CalculationPeriod,
        tourism_object::ComputedCapacity,
    },
};

const RESULT_COLUMNS: &str = r#"
    id, protected_area_id, calculation_period, status, total_pdre, period_total,
    area_pdre, calculation_details, input_parameters, error_message,
    calculation_date, started_at, finished_at
"#;

#[derive(Clone)]
pub struct CalculationsRepository {
    pool: Pool<Postgres>,
}

impl CalculationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a calculation result by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<CalculationResult> {
        let query = format!("SELECT {} FROM calculation_results WHERE id = $1", RESULT_COLUMNS);
        sqlx::query_as::<_, CalculationResult>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Calculation {} not found", id)))
    }

    /// History of an area, newest first
    pub async fn list_for_area(&self, protected_area_id: i32) -> AppResult<Vec<CalculationResult>> {
        let query = format!(
            "SELECT {} FROM calculation_results WHERE protected_area_id = $1 ORDER BY calculation_date DESC, id DESC",
            RESULT_COLUMNS
        );
        let rows = sqlx::query_as::<_, CalculationResult>(&query)
            .bind(protected_area_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Record a new run in `pending` state
    pub async fn create_pending(
        &self,
        protected_area_id: i32,
        period: CalculationPeriod,
        input_parameters: &serde_json::Value,
    ) -> AppResult<CalculationResult> {
        let query = format!(
            r#"
            INSERT INTO calculation_results (protected_area_id, calculation_period, status, input_parameters)
            VALUES ($1, $2, 'pending', $3)
            RETURNING {}
            "#,
            RESULT_COLUMNS
        );
        let row = sqlx::query_as::<_, CalculationResult>(&query)
            .bind(protected_area_id)
            .bind(period)
            .bind(input_parameters)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// `pending → processing`
    pub async fn mark_processing(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE calculation_results
            SET status = 'processing', started_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Calculation {} is not pending",
                id
            )));
        }
        Ok(())
    }

    /// `processing → completed`, writing back object capacities and the area
    /// summary in the same transaction. Skipped objects lose the figures of
    /// earlier runs.
    pub async fn complete(
        &self,
        id: i32,
        method: &str,
        calculation: &AreaCalculation,
    ) -> AppResult<CalculationResult> {
        let mut tx = self.pool.begin().await?;

        for object in &calculation.objects {
            save_computed(&mut *tx, &ComputedCapacity::from(&object.capacity)).await?;
        }
        clear_computed(&mut *tx, &calculation.skipped_object_ids()).await?;

        sqlx::query(
            r#"
            UPDATE protected_areas
            SET pdre_value = $1, calculation_date = NOW(), calculation_method = $2, modif_date = NOW()
            WHERE id = $3
            "#,
        )
        .bind(calculation.total())
        .bind(method)
        .bind(calculation.area_id)
        .execute(&mut *tx)
        .await?;

        let details = serde_json::to_value(calculation.details())
            .map_err(|e| AppError::Internal(format!("Failed to serialize calculation details: {}", e)))?;
        // Sent as text so the json column stores keys in breakdown order
        let breakdown = serde_json::to_string(&calculation.totals.breakdown)
            .map_err(|e| AppError::Internal(format!("Failed to serialize breakdown: {}", e)))?;

        let query = format!(
            r#"
            UPDATE calculation_results
            SET status = 'completed', total_pdre = $1, period_total = $2, area_pdre = $3::json,
                calculation_details = $4, finished_at = NOW()
            WHERE id = $5 AND status = 'processing'
            RETURNING {}
            "#,
            RESULT_COLUMNS
        );
        let row = sqlx::query_as::<_, CalculationResult>(&query)
            .bind(calculation.total())
            .bind(calculation.period_total())
            .bind(breakdown)
            .bind(details)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::Conflict(format!("Calculation {} is not processing", id)))?;

        tx.commit().await?;
        Ok(row)
    }

    /// `pending|processing → failed`
    pub async fn fail(&self, id: i32, message: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE calculation_results
            SET status = 'failed', error_message = $1, finished_at = NOW()
            WHERE id = $2 AND status IN ('pending', 'processing')
            "#,
        )
        .bind(message)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Calculation {} is already finished",
                id
            )));
        }
        Ok(())
    }
}
