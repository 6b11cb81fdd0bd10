//! Error types for the PDRE server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::enums::CalculationStatus;

/// Application error codes exposed in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 3,
    NoSuchData = 5,
    Duplicate = 8,
    BadValue = 18,
    CalculationRejected = 30,
    CalculationInProgress = 31,
}

/// Errors raised by the calculation engine.
///
/// Object-level variants never abort a run: the orchestrator records them as
/// skipped entries. Area-level geometry errors fail the whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    /// Invalid or missing numeric parameter
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing, invalid or unmeasurable geometry
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Area-level aggregation anomaly (reported, never fatal)
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: CalculationStatus,
        to: CalculationStatus,
    },
}

impl CalculationError {
    /// Stable marker written into calculation detail payloads
    pub fn kind(&self) -> &'static str {
        match self {
            CalculationError::Configuration(_) => "configuration_error",
            CalculationError::Geometry(_) => "geometry_error",
            CalculationError::Aggregation(_) => "aggregation_error",
            CalculationError::InvalidTransition { .. } => "invalid_transition",
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::CalculationInProgress, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::Calculation(e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::CalculationRejected, e.to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculation_error_kinds() {
        assert_eq!(CalculationError::Configuration("x".into()).kind(), "configuration_error");
        assert_eq!(CalculationError::Geometry("x".into()).kind(), "geometry_error");
        assert_eq!(CalculationError::Aggregation("x".into()).kind(), "aggregation_error");
    }

    #[test]
    fn test_calculation_error_maps_to_unprocessable() {
        let response = AppError::from(CalculationError::Configuration("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let response = AppError::Conflict("busy".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
