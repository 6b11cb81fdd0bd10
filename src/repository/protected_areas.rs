//! Protected areas repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::geojson_text;
use crate::{
    error::{AppError, AppResult},
    models::protected_area::{CreateProtectedArea, ProtectedArea, UpdateProtectedArea},
};

const AREA_COLUMNS: &str = r#"
    id, name, area_type, ST_AsGeoJSON(boundary)::jsonb AS boundary,
    cadastral_number, description, area_ha, calculation_date, pdre_value,
    calculation_method, calculation_parameters, crea_date, modif_date
"#;

#[derive(Clone)]
pub struct ProtectedAreasRepository {
    pool: Pool<Postgres>,
}

impl ProtectedAreasRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all protected areas ordered by name
    pub async fn list(&self) -> AppResult<Vec<ProtectedArea>> {
        let query = format!("SELECT {} FROM protected_areas ORDER BY name", AREA_COLUMNS);
        let rows = sqlx::query_as::<_, ProtectedArea>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a protected area by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ProtectedArea> {
        let query = format!("SELECT {} FROM protected_areas WHERE id = $1", AREA_COLUMNS);
        sqlx::query_as::<_, ProtectedArea>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Protected area {} not found", id)))
    }

    /// Create a protected area; the database measures its boundary
    pub async fn create(&self, data: &CreateProtectedArea) -> AppResult<ProtectedArea> {
        let query = format!(
            r#"
            INSERT INTO protected_areas
                (name, area_type, boundary, cadastral_number, description, calculation_parameters)
            VALUES ($1, $2, ST_SetSRID(ST_GeomFromGeoJSON($3), 4326), $4, $5, $6)
            RETURNING {}
            "#,
            AREA_COLUMNS
        );

        let row = sqlx::query_as::<_, ProtectedArea>(&query)
            .bind(&data.name)
            .bind(data.area_type)
            .bind(geojson_text(&data.boundary))
            .bind(&data.cadastral_number)
            .bind(&data.description)
            .bind(
                data.calculation_parameters
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({})),
            )
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Update a protected area
    pub async fn update(&self, id: i32, data: &UpdateProtectedArea) -> AppResult<ProtectedArea> {
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
        add_field!(data.area_type, "area_type");
        if data.boundary.is_some() {
            sets.push(format!("boundary = ST_SetSRID(ST_GeomFromGeoJSON(${}), 4326)", idx));
            idx += 1;
        }
        add_field!(data.cadastral_number, "cadastral_number");
        add_field!(data.description, "description");
        add_field!(data.calculation_parameters, "calculation_parameters");

        let query = format!(
            "UPDATE protected_areas SET {} WHERE id = ${} RETURNING {}",
            sets.join(", "),
            idx,
            AREA_COLUMNS
        );

        let boundary = geojson_text(&data.boundary);
        let mut builder = sqlx::query_as::<_, ProtectedArea>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.area_type);
        bind_field!(boundary);
        bind_field!(data.cadastral_number);
        bind_field!(data.description);
        bind_field!(data.calculation_parameters);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Protected area {} not found", id)))
    }

    /// Delete a protected area with its objects and results
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM protected_areas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Protected area {} not found", id)));
        }
        Ok(())
    }
}
