//! Tourism objects repository

use chrono::Utc;
use sqlx::{types::Json, Pool, Postgres};

use super::geojson_text;
use crate::{
    error::{AppError, AppResult},
    models::tourism_object::{
        ComputedCapacity, CreateTourismObject, TourismObject, UpdateTourismObject,
    },
};

const OBJECT_COLUMNS: &str = r#"
    id, protected_area_id, name, object_type, tourism_type,
    ST_AsGeoJSON(geometry)::jsonb AS geometry, length_km, area_sq_m, buffer_radius_m,
    area_per_visitor, operating_hours, avg_visit_duration, avg_group_size, management_factor,
    correction_factors, route_segments, return_factor, correction_value, base_capacity,
    potential_capacity, pdre_capacity, data_source, is_active, crea_date, modif_date
"#;

/// Zoned limiting factors whose zone intersects the object aliased `o`
const INTERSECTING_ZONES: &str = r#"
    ARRAY(
        SELECT f.id FROM limiting_factors f
        WHERE f.zone IS NOT NULL AND o.geometry IS NOT NULL AND ST_Intersects(f.zone, o.geometry)
        ORDER BY f.id
    ) AS intersecting_zone_ids
"#;

#[derive(Clone)]
pub struct TourismObjectsRepository {
    pool: Pool<Postgres>,
}

impl TourismObjectsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List tourism objects, optionally restricted to one protected area
    pub async fn list(&self, protected_area_id: Option<i32>) -> AppResult<Vec<TourismObject>> {
        let where_clause = if protected_area_id.is_some() {
            "WHERE protected_area_id = $1"
        } else {
            ""
        };
        let query = format!(
            "SELECT {} FROM tourism_objects {} ORDER BY name, id",
            OBJECT_COLUMNS, where_clause
        );

        let mut builder = sqlx::query_as::<_, TourismObject>(&query);
        if let Some(area_id) = protected_area_id {
            builder = builder.bind(area_id);
        }
        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Active objects of an area in creation order
    pub async fn list_active(&self, protected_area_id: i32) -> AppResult<Vec<TourismObject>> {
        let query = format!(
            "SELECT {} FROM tourism_objects WHERE protected_area_id = $1 AND is_active ORDER BY id",
            OBJECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, TourismObject>(&query)
            .bind(protected_area_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Active objects of an area in creation order, with their intersecting zones
    pub async fn list_calculation_inputs(&self, protected_area_id: i32) -> AppResult<Vec<TourismObject>> {
        let query = format!(
            "SELECT {}, {} FROM tourism_objects o WHERE o.protected_area_id = $1 AND o.is_active ORDER BY o.id",
            OBJECT_COLUMNS, INTERSECTING_ZONES
        );
        let rows = sqlx::query_as::<_, TourismObject>(&query)
            .bind(protected_area_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// One object with its intersecting zones
    pub async fn get_calculation_input(&self, id: i32) -> AppResult<TourismObject> {
        let query = format!(
            "SELECT {}, {} FROM tourism_objects o WHERE o.id = $1",
            OBJECT_COLUMNS, INTERSECTING_ZONES
        );
        sqlx::query_as::<_, TourismObject>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tourism object {} not found", id)))
    }

    /// Get a tourism object by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<TourismObject> {
        let query = format!("SELECT {} FROM tourism_objects WHERE id = $1", OBJECT_COLUMNS);
        sqlx::query_as::<_, TourismObject>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tourism object {} not found", id)))
    }

    /// Create a tourism object; length/area are measured by the database
    pub async fn create(&self, data: &CreateTourismObject) -> AppResult<TourismObject> {
        let query = format!(
            r#"
            INSERT INTO tourism_objects (
                protected_area_id, name, object_type, tourism_type, geometry,
                length_km, area_sq_m, buffer_radius_m, area_per_visitor, operating_hours,
                avg_visit_duration, avg_group_size, management_factor,
                correction_factors, route_segments, data_source, is_active
            )
            VALUES (
                $1, $2, $3, $4, ST_SetSRID(ST_GeomFromGeoJSON($5), 4326),
                $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17
            )
            RETURNING {}
            "#,
            OBJECT_COLUMNS
        );

        let row = sqlx::query_as::<_, TourismObject>(&query)
            .bind(data.protected_area_id)
            .bind(&data.name)
            .bind(data.object_type)
            .bind(data.tourism_type)
            .bind(geojson_text(&data.geometry))
            .bind(data.length_km)
            .bind(data.area_sq_m)
            .bind(data.buffer_radius_m)
            .bind(data.area_per_visitor)
            .bind(data.operating_hours)
            .bind(data.avg_visit_duration)
            .bind(data.avg_group_size)
            .bind(data.management_factor)
            .bind(Json(data.correction_factors.clone().unwrap_or_default()))
            .bind(Json(data.route_segments.clone().unwrap_or_default()))
            .bind(&data.data_source)
            .bind(data.is_active.unwrap_or(true))
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Update a tourism object
    pub async fn update(&self, id: i32, data: &UpdateTourismObject) -> AppResult<TourismObject> {
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
        add_field!(data.object_type, "object_type");
        add_field!(data.tourism_type, "tourism_type");
        if data.geometry.is_some() {
            sets.push(format!("geometry = ST_SetSRID(ST_GeomFromGeoJSON(${}), 4326)", idx));
            idx += 1;
        }
        add_field!(data.length_km, "length_km");
        add_field!(data.area_sq_m, "area_sq_m");
        add_field!(data.buffer_radius_m, "buffer_radius_m");
        add_field!(data.area_per_visitor, "area_per_visitor");
        add_field!(data.operating_hours, "operating_hours");
        add_field!(data.avg_visit_duration, "avg_visit_duration");
        add_field!(data.avg_group_size, "avg_group_size");
        add_field!(data.management_factor, "management_factor");
        add_field!(data.correction_factors, "correction_factors");
        add_field!(data.route_segments, "route_segments");
        add_field!(data.data_source, "data_source");
        add_field!(data.is_active, "is_active");

        let query = format!(
            "UPDATE tourism_objects SET {} WHERE id = ${} RETURNING {}",
            sets.join(", "),
            idx,
            OBJECT_COLUMNS
        );

        let geometry = geojson_text(&data.geometry);
        let correction_factors = data.correction_factors.clone().map(Json);
        let route_segments = data.route_segments.clone().map(Json);
        let mut builder = sqlx::query_as::<_, TourismObject>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.object_type);
        bind_field!(data.tourism_type);
        bind_field!(geometry);
        bind_field!(data.length_km);
        bind_field!(data.area_sq_m);
        bind_field!(data.buffer_radius_m);
        bind_field!(data.area_per_visitor);
        bind_field!(data.operating_hours);
        bind_field!(data.avg_visit_duration);
        bind_field!(data.avg_group_size);
        bind_field!(data.management_factor);
        bind_field!(correction_factors);
        bind_field!(route_segments);
        bind_field!(data.data_source);
        bind_field!(data.is_active);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tourism object {} not found", id)))
    }

    /// Delete a tourism object
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tourism_objects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tourism object {} not found", id)));
        }
        Ok(())
    }

    /// Overwrite the computed fields of one object
    pub async fn save_computed(&self, computed: &ComputedCapacity) -> AppResult<()> {
        save_computed(&self.pool, computed).await
    }
}

/// Shared by the single-object path and the area transaction
pub(crate) async fn save_computed<'e, E>(executor: E, computed: &ComputedCapacity) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        UPDATE tourism_objects
        SET return_factor = $1, correction_value = $2, base_capacity = $3,
            potential_capacity = $4, pdre_capacity = $5, modif_date = NOW()
        WHERE id = $6
        "#,
    )
    .bind(computed.return_factor)
    .bind(computed.correction_value)
    .bind(computed.base_capacity)
    .bind(computed.potential_capacity)
    .bind(computed.pdre_capacity)
    .bind(computed.object_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Reset the computed fields of objects that were left out of a run
pub(crate) async fn clear_computed<'e, E>(executor: E, object_ids: &[i32]) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    if object_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        UPDATE tourism_objects
        SET return_factor = NULL, correction_value = NULL, base_capacity = NULL,
            potential_capacity = NULL, pdre_capacity = NULL, modif_date = NOW()
        WHERE id = ANY($1)
        "#,
    )
    .bind(object_ids)
    .execute(executor)
    .await?;
    Ok(())
}
