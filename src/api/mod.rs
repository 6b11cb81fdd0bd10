//! API handlers for the PDRE REST endpoints

pub mod calculations;
pub mod health;
pub mod limiting_factors;
pub mod openapi;
pub mod protected_areas;
pub mod tourism_objects;
