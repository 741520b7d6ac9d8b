//! Allocation data model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pooling::error::PoolingError;

/// Smallest seat count a car may be registered with.
pub const MIN_SEATS: u8 = 4;
/// Largest seat count a car may be registered with.
pub const MAX_SEATS: u8 = 6;
/// Smallest passenger group accepted.
pub const MIN_PASSENGERS: u8 = 1;
/// Largest passenger group accepted.
pub const MAX_PASSENGERS: u8 = 6;

macro_rules! positive_id {
    ($name:ident, $what:literal) => {
        #[doc = concat!("Caller-assigned ", $what, " identifier. Always positive.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Raw identifier value.
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = PoolingError;

            fn try_from(raw: i64) -> Result<Self, Self::Error> {
                match u32::try_from(raw) {
                    Ok(id) if id > 0 => Ok(Self(id)),
                    _ if raw > 0 => Err(PoolingError::InvalidArgument(format!(
                        concat!($what, " id {} exceeds {}"),
                        raw,
                        u32::MAX
                    ))),
                    _ => Err(PoolingError::InvalidArgument(format!(
                        concat!($what, " id {} is not a positive integer"),
                        raw
                    ))),
                }
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(CarId, "car");
positive_id!(JourneyId, "journey");

/// Car registration as received from the caller, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarSpec {
    pub id: i64,
    /// Seat capacity (`maxSeats` is accepted as well).
    #[serde(alias = "maxSeats", alias = "max_seats")]
    pub seats: i64,
}

impl CarSpec {
    pub fn new(id: i64, seats: i64) -> Self {
        Self { id, seats }
    }
}

/// Journey request as received from the caller, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneySpec {
    pub id: i64,
    /// Group size (`passengers` is accepted as well).
    #[serde(alias = "passengers")]
    pub people: i64,
}

impl JourneySpec {
    pub fn new(id: i64, people: i64) -> Self {
        Self { id, people }
    }
}

/// Where a journey currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Waiting in the pending queue.
    Unassigned,
    /// Riding in the given car.
    Assigned(CarId),
}

impl Assignment {
    pub fn car(self) -> Option<CarId> {
        match self {
            Assignment::Unassigned => None,
            Assignment::Assigned(car) => Some(car),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Car {
    pub id: CarId,
    pub max_seats: u8,
    pub available_seats: u8,
}

impl Car {
    pub fn is_empty(&self) -> bool {
        self.available_seats == self.max_seats
    }

    pub fn view(&self) -> CarView {
        CarView {
            id: self.id.get(),
            max_seats: self.max_seats,
            available_seats: self.available_seats,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Journey {
    pub id: JourneyId,
    pub passengers: u8,
    pub assignment: Assignment,
}

/// Snapshot of a car's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarView {
    pub id: u32,
    pub max_seats: u8,
    pub available_seats: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyState {
    Active,
    Pending,
}

/// Snapshot of a journey for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyView {
    pub id: u32,
    pub passengers: u8,
    pub state: JourneyState,
    pub car: Option<u32>,
}

/// Aggregate counters over the engine state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub cars: usize,
    pub active_journeys: usize,
    pub pending_journeys: usize,
    pub free_seats: usize,
}
