//! Shared domain enums, stored as snake_case text columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements the string conversions and the SQLx text mapping for a slug enum.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $slug:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $slug,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($slug => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// AreaType
// ---------------------------------------------------------------------------

/// Protected area jurisdiction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AreaType {
    Federal,
    Regional,
    Local,
}

text_enum!(AreaType {
    Federal => "federal",
    Regional => "regional",
    Local => "local",
});

// ---------------------------------------------------------------------------
// ObjectType
// ---------------------------------------------------------------------------

/// Geometric class of a tourism object; decides which physical size is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// Recreation site measured by area (m²)
    Areal,
    /// Route or trail measured by length (km)
    Linear,
    /// Viewpoint or stop measured by its buffer area (m²)
    Point,
}

text_enum!(ObjectType {
    Areal => "areal",
    Linear => "linear",
    Point => "point",
});

// ---------------------------------------------------------------------------
// TourismType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TourismType {
    DayTrip,
    MultiDay,
    Autonomous,
    Facility,
}

text_enum!(TourismType {
    DayTrip => "day_trip",
    MultiDay => "multi_day",
    Autonomous => "autonomous",
    Facility => "facility",
});

// ---------------------------------------------------------------------------
// FactorType
// ---------------------------------------------------------------------------

/// Limiting factor category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FactorType {
    Ecological,
    Social,
    Cultural,
    Infrastructure,
}

text_enum!(FactorType {
    Ecological => "ecological",
    Social => "social",
    Cultural => "cultural",
    Infrastructure => "infrastructure",
});

// ---------------------------------------------------------------------------
// CalculationStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a calculation run: `pending → processing → {completed | failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalculationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

text_enum!(CalculationStatus {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
});

impl CalculationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CalculationStatus::Completed | CalculationStatus::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    /// A pending run may fail directly when it cannot even start.
    pub fn can_transition_to(&self, next: CalculationStatus) -> bool {
        matches!(
            (self, next),
            (CalculationStatus::Pending, CalculationStatus::Processing)
                | (CalculationStatus::Pending, CalculationStatus::Failed)
                | (CalculationStatus::Processing, CalculationStatus::Completed)
                | (CalculationStatus::Processing, CalculationStatus::Failed)
        )
    }
}

// ---------------------------------------------------------------------------
// CalculationPeriod
// ---------------------------------------------------------------------------

/// Reporting period of a run. Capacities are daily; the period scales the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalculationPeriod {
    Day,
    Week,
    #[default]
    Month,
    Season,
    Year,
}

text_enum!(CalculationPeriod {
    Day => "day",
    Week => "week",
    Month => "month",
    Season => "season",
    Year => "year",
});

impl CalculationPeriod {
    pub fn days(&self) -> u32 {
        match self {
            CalculationPeriod::Day => 1,
            CalculationPeriod::Week => 7,
            CalculationPeriod::Month => 30,
            CalculationPeriod::Season => 90,
            CalculationPeriod::Year => 365,
        }
    }
}
