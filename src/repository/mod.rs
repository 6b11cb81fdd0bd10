//! Repository layer for database operations

pub mod calculations;
pub mod limiting_factors;
pub mod protected_areas;
pub mod tourism_objects;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub protected_areas: protected_areas::ProtectedAreasRepository,
    pub tourism_objects: tourism_objects::TourismObjectsRepository,
    pub limiting_factors: limiting_factors::LimitingFactorsRepository,
    pub calculations: calculations::CalculationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            protected_areas: protected_areas::ProtectedAreasRepository::new(pool.clone()),
            tourism_objects: tourism_objects::TourismObjectsRepository::new(pool.clone()),
            limiting_factors: limiting_factors::LimitingFactorsRepository::new(pool.clone()),
            calculations: calculations::CalculationsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// GeoJSON value to the text form accepted by `ST_GeomFromGeoJSON`
pub(crate) fn geojson_text(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}
