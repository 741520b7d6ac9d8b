//! Car pooling allocation subsystem.
//!
//! # Data Flow
//! ```text
//! PUT /cars       → Engine::reset_fleet      (fleet replaced, journeys forgotten)
//! POST /journey   → Engine::request_journey  (pending re-evaluated, then new journey)
//! POST /dropoff   → Engine::dropoff          → Engine::reassign (freed car)
//! POST /locate    → Engine::locate
//! ```
//!
//! # Design Decisions
//! - `Engine` owns the collections and mutates through `&mut self`
//! - `SharedEngine` is the only place a lock is taken; one lock per operation
//! - New journeys only go to fully empty cars; reassignment after a dropoff
//!   accepts partially occupied cars. The two rules differ on purpose.

pub mod engine;
pub mod error;
pub mod shared;
pub mod types;

pub use engine::Engine;
pub use error::{PoolingError, PoolingResult};
pub use shared::SharedEngine;
pub use types::{
    Assignment, CarId, CarSpec, CarView, EngineStats, JourneyId, JourneySpec, JourneyState,
    JourneyView, MAX_PASSENGERS, MAX_SEATS, MIN_PASSENGERS, MIN_SEATS,
};
