//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{calculations, health, limiting_factors, protected_areas, tourism_objects};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PDRE API",
        version = "0.3.0",
        description = "Recreational carrying capacity (PDRE) of protected areas"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Protected areas
        protected_areas::list_areas,
        protected_areas::get_area,
        protected_areas::create_area,
        protected_areas::update_area,
        protected_areas::delete_area,
        protected_areas::list_area_objects,
        // Tourism objects
        tourism_objects::list_objects,
        tourism_objects::get_object,
        tourism_objects::create_object,
        tourism_objects::update_object,
        tourism_objects::delete_object,
        tourism_objects::recalculate_object,
        // Limiting factors
        limiting_factors::list_factors,
        limiting_factors::get_factor,
        limiting_factors::create_factor,
        limiting_factors::update_factor,
        limiting_factors::delete_factor,
        // Calculations
        protected_areas::calculate_area,
        protected_areas::quick_calculate,
        protected_areas::list_area_calculations,
        calculations::get_calculation,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::AreaType,
            crate::models::enums::ObjectType,
            crate::models::enums::TourismType,
            crate::models::enums::FactorType,
            crate::models::enums::CalculationStatus,
            crate::models::enums::CalculationPeriod,
            // Protected areas
            crate::models::protected_area::ProtectedArea,
            crate::models::protected_area::CreateProtectedArea,
            crate::models::protected_area::UpdateProtectedArea,
            // Tourism objects
            crate::models::tourism_object::TourismObject,
            crate::models::tourism_object::CreateTourismObject,
            crate::models::tourism_object::UpdateTourismObject,
            crate::models::tourism_object::RecalculatedObject,
            crate::engine::RouteSegment,
            // Limiting factors
            crate::models::limiting_factor::LimitingFactor,
            crate::models::limiting_factor::CreateLimitingFactor,
            crate::models::limiting_factor::UpdateLimitingFactor,
            // Calculations
            crate::models::calculation_result::CalculationResult,
            crate::models::calculation_result::CalculationRequest,
            crate::models::calculation_result::QuickCalculation,
            crate::config::CalculationDefaults,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "protected_areas", description = "Protected area management"),
        (name = "tourism_objects", description = "Routes, sites and points inside protected areas"),
        (name = "limiting_factors", description = "Ecological, social, cultural and infrastructure limits"),
        (name = "calculations", description = "PDRE calculation runs and history")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use utoipa::openapi::PathItemType;

    use super::*;

    #[test]
    fn test_openapi_lists_calculation_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/protected-areas/{id}/calculate"));
        assert!(paths.contains_key("/calculations/{id}"));
        assert!(paths.contains_key("/tourism-objects/{id}/recalculate"));
        assert!(paths.contains_key("/protected-areas/{id}/quick-calculate"));
    }

    #[test]
    fn test_factor_list_accepts_type_filter() {
        let doc = ApiDoc::openapi();
        let list = &doc.paths.paths["/limiting-factors"].operations[&PathItemType::Get];
        let names: Vec<&str> = list
            .parameters
            .iter()
            .flatten()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["factor_type"]);
    }
}
