//! PDRE Server
//!
//! Computes the recreational carrying capacity (PDRE) of protected areas from
//! the geometry and visitor behavior of their tourism objects, and serves the
//! results over a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
