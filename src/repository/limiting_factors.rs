//! Limiting factors repository

use chrono::Utc;
use sqlx::{Pool, Postgres, Transaction};

use super::geojson_text;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::FactorType,
        limiting_factor::{CreateLimitingFactor, LimitingFactor, UpdateLimitingFactor},
    },
};

const FACTOR_COLUMNS: &str = r#"
    f.id, f.name, f.factor_type, f.description, f.coefficient_value, f.calculation_formula,
    f.apply_to_all,
    ARRAY(
        SELECT a.protected_area_id FROM limiting_factor_areas a
        WHERE a.limiting_factor_id = f.id ORDER BY a.protected_area_id
    ) AS protected_area_ids,
    ST_AsGeoJSON(f.zone)::jsonb AS zone, f.crea_date, f.modif_date
"#;

#[derive(Clone)]
pub struct LimitingFactorsRepository {
    pool: Pool<Postgres>,
}

impl LimitingFactorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List limiting factors, optionally of one type
    pub async fn list(&self, factor_type: Option<FactorType>) -> AppResult<Vec<LimitingFactor>> {
        let where_clause = if factor_type.is_some() {
            "WHERE f.factor_type = $1"
        } else {
            ""
        };
        let query = format!(
            "SELECT {} FROM limiting_factors f {} ORDER BY f.id",
            FACTOR_COLUMNS, where_clause
        );

        let mut builder = sqlx::query_as::<_, LimitingFactor>(&query);
        if let Some(factor_type) = factor_type {
            builder = builder.bind(factor_type);
        }
        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Factors that apply to an area, globally or by association
    pub async fn list_for_area(&self, protected_area_id: i32) -> AppResult<Vec<LimitingFactor>> {
        let query = format!(
            r#"
            SELECT {} FROM limiting_factors f
            WHERE f.apply_to_all
               OR EXISTS (
                   SELECT 1 FROM limiting_factor_areas a
                   WHERE a.limiting_factor_id = f.id AND a.protected_area_id = $1
               )
            ORDER BY f.id
            "#,
            FACTOR_COLUMNS
        );
        let rows = sqlx::query_as::<_, LimitingFactor>(&query)
            .bind(protected_area_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a limiting factor by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<LimitingFactor> {
        let query = format!("SELECT {} FROM limiting_factors f WHERE f.id = $1", FACTOR_COLUMNS);
        sqlx::query_as::<_, LimitingFactor>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Limiting factor {} not found", id)))
    }

    /// Create a limiting factor with its area associations
    pub async fn create(&self, data: &CreateLimitingFactor) -> AppResult<LimitingFactor> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO limiting_factors
                (name, factor_type, description, coefficient_value, calculation_formula, apply_to_all, zone)
            VALUES ($1, $2, $3, $4, $5, $6, ST_SetSRID(ST_GeomFromGeoJSON($7), 4326))
            RETURNING id
            "#,
        )
        .bind(&data.name)
        .bind(data.factor_type)
        .bind(&data.description)
        .bind(data.coefficient_value)
        .bind(&data.calculation_formula)
        .bind(data.apply_to_all.unwrap_or(true))
        .bind(geojson_text(&data.zone))
        .fetch_one(&mut *tx)
        .await?;

        if let Some(ref area_ids) = data.protected_area_ids {
            replace_areas(&mut tx, id, area_ids).await?;
        }

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Update a limiting factor; `protected_area_ids` replaces the associations
    pub async fn update(&self, id: i32, data: &UpdateLimitingFactor) -> AppResult<LimitingFactor> {
        let now = Utc::now();
        let mut sets = vec!["modif_date = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.factor_type, "factor_type");
        add_field!(data.description, "description");
        add_field!(data.coefficient_value, "coefficient_value");
        add_field!(data.calculation_formula, "calculation_formula");
        add_field!(data.apply_to_all, "apply_to_all");
        if data.zone.is_some() {
            sets.push(format!("zone = ST_SetSRID(ST_GeomFromGeoJSON(${}), 4326)", idx));
            idx += 1;
        }

        let query = format!(
            "UPDATE limiting_factors SET {} WHERE id = ${}",
            sets.join(", "),
            idx
        );

        let zone = geojson_text(&data.zone);
        let mut builder = sqlx::query(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.factor_type);
        bind_field!(data.description);
        bind_field!(data.coefficient_value);
        bind_field!(data.calculation_formula);
        bind_field!(data.apply_to_all);
        bind_field!(zone);

        let mut tx = self.pool.begin().await?;
        let result = builder.bind(id).execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Limiting factor {} not found", id)));
        }

        if let Some(ref area_ids) = data.protected_area_ids {
            replace_areas(&mut tx, id, area_ids).await?;
        }

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Delete a limiting factor and its associations
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM limiting_factors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Limiting factor {} not found", id)));
        }
        Ok(())
    }
}

async fn replace_areas(
    tx: &mut Transaction<'_, Postgres>,
    factor_id: i32,
    area_ids: &[i32],
) -> AppResult<()> {
    sqlx::query("DELETE FROM limiting_factor_areas WHERE limiting_factor_id = $1")
        .bind(factor_id)
        .execute(&mut **tx)
        .await?;

    if !area_ids.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO limiting_factor_areas (limiting_factor_id, protected_area_id)
            SELECT $1, UNNEST($2::int4[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(factor_id)
        .bind(area_ids)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
