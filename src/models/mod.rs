//! Data models for the PDRE server

pub mod calculation_result;
pub mod enums;
pub mod limiting_factor;
pub mod protected_area;
pub mod tourism_object;

// Re-export commonly used types
pub use calculation_result::{CalculationRequest, CalculationResult};
pub use enums::{AreaType, CalculationPeriod, CalculationStatus, FactorType, ObjectType, TourismType};
pub use limiting_factor::LimitingFactor;
pub use protected_area::ProtectedArea;
pub use tourism_object::TourismObject;
