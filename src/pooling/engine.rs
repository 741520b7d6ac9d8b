//! Allocation engine: fleet, journeys and the pending queue.
//!
//! # Responsibilities
//! - Replace the fleet wholesale on reset
//! - Seat new journeys in fully empty cars, or queue them
//! - Free seats on dropoff and promote one pending journey into the freed car
//! - Answer where a journey currently rides
//!
//! # Design Decisions
//! - Each journey carries an [`Assignment`]; `Unassigned` journeys are exactly
//!   the ids held in the pending queue
//! - The fleet is ordered by id. When several empty cars could take a journey
//!   the lowest id wins. Any eligible car would be correct; this choice just
//!   keeps outcomes reproducible.
//! - Validation always completes before the first mutation

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::observability::metrics;
use crate::pooling::error::{PoolingError, PoolingResult};
use crate::pooling::types::{
    Assignment, Car, CarId, CarSpec, CarView, EngineStats, Journey, JourneyId, JourneySpec,
    JourneyState, JourneyView, MAX_PASSENGERS, MAX_SEATS, MIN_PASSENGERS, MIN_SEATS,
};

/// Single-owner allocation state. Wrap in [`crate::pooling::SharedEngine`]
/// to share between tasks.
#[derive(Debug, Default)]
pub struct Engine {
    fleet: BTreeMap<CarId, Car>,
    journeys: HashMap<JourneyId, Journey>,
    pending: VecDeque<JourneyId>,
}

impl Engine {
    /// Create an engine with no cars and no journeys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fleet. All journeys, active or pending, are forgotten.
    ///
    /// Fails without touching state if any car has an invalid id or seat
    /// count, or if two cars share an id.
    pub fn reset_fleet(&mut self, cars: Vec<CarSpec>) -> PoolingResult<()> {
        let validated = cars
            .iter()
            .map(|spec| -> PoolingResult<(CarId, u8)> {
                Ok((CarId::try_from(spec.id)?, validate_seats(spec.seats)?))
            })
            .collect::<PoolingResult<Vec<_>>>()?;

        let mut fleet = BTreeMap::new();
        for (id, seats) in validated {
            if fleet.contains_key(&id) {
                return Err(PoolingError::DuplicateId(id.get()));
            }
            fleet.insert(
                id,
                Car {
                    id,
                    max_seats: seats,
                    available_seats: seats,
                },
            );
        }

        let dropped = self.journeys.len();
        self.fleet = fleet;
        self.journeys.clear();
        self.pending.clear();

        tracing::info!(cars = self.fleet.len(), dropped_journeys = dropped, "Fleet reset");
        self.debug_check();
        Ok(())
    }

    /// Register a new journey.
    ///
    /// Pending journeys are retried first, oldest first, so a new arrival
    /// never takes capacity a waiting group could use. The new journey is then
    /// seated in an empty car or appended to the pending queue.
    pub fn request_journey(&mut self, spec: JourneySpec) -> PoolingResult<Assignment> {
        let id = JourneyId::try_from(spec.id)?;
        let passengers = validate_passengers(spec.people)?;
        if self.journeys.contains_key(&id) {
            return Err(PoolingError::DuplicateId(id.get()));
        }

        self.retry_pending();

        let assignment = match self.find_empty_car(passengers) {
            Some(car) => {
                self.board(car, passengers);
                metrics::record_assignment("direct");
                tracing::debug!(journey = %id, car = %car, passengers, "Journey assigned");
                Assignment::Assigned(car)
            }
            None => {
                self.pending.push_back(id);
                tracing::debug!(journey = %id, passengers, pending = self.pending.len(), "Journey queued");
                Assignment::Unassigned
            }
        };

        self.journeys.insert(
            id,
            Journey {
                id,
                passengers,
                assignment,
            },
        );
        self.debug_check();
        Ok(assignment)
    }

    /// Remove a journey. Returns the car whose seats were freed, if the
    /// journey was riding. The caller is expected to follow up with
    /// [`Engine::reassign`] on that car.
    pub fn dropoff(&mut self, id: JourneyId) -> PoolingResult<Option<CarId>> {
        let journey = self
            .journeys
            .remove(&id)
            .ok_or(PoolingError::NotFound(id.get()))?;

        let freed = match journey.assignment {
            Assignment::Unassigned => {
                self.pending.retain(|pending| *pending != id);
                tracing::debug!(journey = %id, "Pending journey dropped off");
                None
            }
            Assignment::Assigned(car_id) => {
                if let Some(car) = self.fleet.get_mut(&car_id) {
                    car.available_seats += journey.passengers;
                }
                tracing::debug!(journey = %id, car = %car_id, "Journey dropped off");
                Some(car_id)
            }
        };

        self.debug_check();
        Ok(freed)
    }

    /// Seat the first pending journey that fits in the car's free seats.
    ///
    /// Unlike [`Engine::request_journey`] the car does not have to be empty.
    /// At most one journey is promoted per call.
    pub fn reassign(&mut self, car_id: CarId) -> Option<JourneyId> {
        let available = self.fleet.get(&car_id)?.available_seats;

        let position = self.pending.iter().position(|id| {
            self.journeys
                .get(id)
                .is_some_and(|journey| journey.passengers <= available)
        })?;
        let id = self.pending.remove(position)?;

        let journey = self.journeys.get_mut(&id)?;
        journey.assignment = Assignment::Assigned(car_id);
        let passengers = journey.passengers;
        self.board(car_id, passengers);

        metrics::record_assignment("reassign");
        tracing::info!(journey = %id, car = %car_id, passengers, "Pending journey reassigned");
        self.debug_check();
        Some(id)
    }

    /// Car a journey rides in. `Ok(None)` means the journey is still pending.
    pub fn locate(&self, id: JourneyId) -> PoolingResult<Option<CarView>> {
        let journey = self
            .journeys
            .get(&id)
            .ok_or(PoolingError::NotFound(id.get()))?;

        Ok(journey
            .assignment
            .car()
            .and_then(|car| self.fleet.get(&car))
            .map(Car::view))
    }

    /// Snapshot of every car, ordered by id.
    pub fn fleet(&self) -> Vec<CarView> {
        self.fleet.values().map(Car::view).collect()
    }

    /// Snapshot of every journey: riding ones by id, then the pending queue
    /// in arrival order.
    pub fn journeys(&self) -> Vec<JourneyView> {
        let mut active: Vec<JourneyView> = self
            .journeys
            .values()
            .filter_map(|journey| {
                journey.assignment.car().map(|car| JourneyView {
                    id: journey.id.get(),
                    passengers: journey.passengers,
                    state: JourneyState::Active,
                    car: Some(car.get()),
                })
            })
            .collect();
        active.sort_by_key(|view| view.id);

        let pending = self.pending.iter().filter_map(|id| self.journeys.get(id)).map(|journey| JourneyView {
            id: journey.id.get(),
            passengers: journey.passengers,
            state: JourneyState::Pending,
            car: None,
        });

        active.into_iter().chain(pending).collect()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cars: self.fleet.len(),
            active_journeys: self.journeys.len() - self.pending.len(),
            pending_journeys: self.pending.len(),
            free_seats: self
                .fleet
                .values()
                .map(|car| usize::from(car.available_seats))
                .sum(),
        }
    }

    /// Verify the bookkeeping invariants. Returns a description of the first
    /// violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut occupied: HashMap<CarId, u32> = HashMap::new();
        let queued: HashSet<JourneyId> = self.pending.iter().copied().collect();

        if queued.len() != self.pending.len() {
            return Err("pending queue holds a journey twice".into());
        }

        for journey in self.journeys.values() {
            match journey.assignment {
                Assignment::Unassigned => {
                    if !queued.contains(&journey.id) {
                        return Err(format!("journey {} unassigned but not queued", journey.id));
                    }
                }
                Assignment::Assigned(car) => {
                    if queued.contains(&journey.id) {
                        return Err(format!("journey {} assigned and queued", journey.id));
                    }
                    if !self.fleet.contains_key(&car) {
                        return Err(format!("journey {} rides unknown car {}", journey.id, car));
                    }
                    *occupied.entry(car).or_default() += u32::from(journey.passengers);
                }
            }
        }

        for id in &self.pending {
            if !self.journeys.contains_key(id) {
                return Err(format!("queued journey {} is unknown", id));
            }
        }

        for car in self.fleet.values() {
            if car.available_seats > car.max_seats {
                return Err(format!("car {} has more free seats than seats", car.id));
            }
            let taken = occupied.get(&car.id).copied().unwrap_or(0);
            if taken != u32::from(car.max_seats - car.available_seats) {
                return Err(format!(
                    "car {} carries {} passengers but has {} seats taken",
                    car.id,
                    taken,
                    car.max_seats - car.available_seats
                ));
            }
        }

        Ok(())
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.check_invariants(), Ok(()));
    }

    /// Exact-fit rule: only a fully empty car with enough seats qualifies.
    fn find_empty_car(&self, passengers: u8) -> Option<CarId> {
        self.fleet
            .values()
            .find(|car| car.is_empty() && car.available_seats >= passengers)
            .map(|car| car.id)
    }

    fn retry_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let queue = std::mem::take(&mut self.pending);
        for id in queue {
            let Some(passengers) = self.journeys.get(&id).map(|journey| journey.passengers) else {
                continue;
            };
            match self.find_empty_car(passengers) {
                Some(car) => {
                    self.board(car, passengers);
                    if let Some(journey) = self.journeys.get_mut(&id) {
                        journey.assignment = Assignment::Assigned(car);
                    }
                    metrics::record_assignment("pending");
                    tracing::info!(journey = %id, car = %car, "Pending journey assigned");
                }
                None => self.pending.push_back(id),
            }
        }
    }

    fn board(&mut self, car_id: CarId, passengers: u8) {
        if let Some(car) = self.fleet.get_mut(&car_id) {
            car.available_seats -= passengers;
        }
    }
}

fn validate_seats(seats: i64) -> PoolingResult<u8> {
    match u8::try_from(seats) {
        Ok(seats) if (MIN_SEATS..=MAX_SEATS).contains(&seats) => Ok(seats),
        _ => Err(PoolingError::InvalidCapacity(format!(
            "car seats {} outside {}..={}",
            seats, MIN_SEATS, MAX_SEATS
        ))),
    }
}

fn validate_passengers(people: i64) -> PoolingResult<u8> {
    match u8::try_from(people) {
        Ok(people) if (MIN_PASSENGERS..=MAX_PASSENGERS).contains(&people) => Ok(people),
        _ => Err(PoolingError::InvalidCapacity(format!(
            "journey people {} outside {}..={}",
            people, MIN_PASSENGERS, MAX_PASSENGERS
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: u32) -> CarId {
        CarId::try_from(i64::from(id)).unwrap()
    }

    fn journey(id: u32) -> JourneyId {
        JourneyId::try_from(i64::from(id)).unwrap()
    }

    fn engine_with(cars: &[(i64, i64)]) -> Engine {
        let mut engine = Engine::new();
        engine
            .reset_fleet(cars.iter().map(|&(id, seats)| CarSpec::new(id, seats)).collect())
            .unwrap();
        engine
    }

    #[test]
    fn test_reset_rejects_invalid_capacity() {
        let mut engine = Engine::new();
        for seats in [0, 3, 7, -1] {
            let result = engine.reset_fleet(vec![CarSpec::new(1, 4), CarSpec::new(2, seats)]);
            assert!(matches!(result, Err(PoolingError::InvalidCapacity(_))), "seats {}", seats);
            assert!(engine.fleet().is_empty());
        }
    }

    #[test]
    fn test_reset_rejects_duplicates_atomically() {
        let mut engine = engine_with(&[(9, 5)]);
        let result = engine.reset_fleet(vec![CarSpec::new(1, 4), CarSpec::new(2, 6), CarSpec::new(1, 5)]);
        assert_eq!(result, Err(PoolingError::DuplicateId(1)));

        // previous fleet untouched
        let fleet = engine.fleet();
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet[0].id, 9);
    }

    #[test]
    fn test_reset_checks_capacity_before_duplicates() {
        let mut engine = Engine::new();
        let result = engine.reset_fleet(vec![CarSpec::new(1, 4), CarSpec::new(1, 4), CarSpec::new(2, 9)]);
        assert!(matches!(result, Err(PoolingError::InvalidCapacity(_))));
    }

    #[test]
    fn test_reset_rejects_non_positive_car_id() {
        let mut engine = Engine::new();
        let result = engine.reset_fleet(vec![CarSpec::new(0, 4)]);
        assert!(matches!(result, Err(PoolingError::InvalidArgument(_))));
    }

    #[test]
    fn test_reset_forgets_journeys() {
        let mut engine = engine_with(&[(1, 4)]);
        engine.request_journey(JourneySpec::new(1, 4)).unwrap();
        engine.request_journey(JourneySpec::new(2, 2)).unwrap();

        engine.reset_fleet(vec![CarSpec::new(2, 6)]).unwrap();
        assert_eq!(engine.locate(journey(1)), Err(PoolingError::NotFound(1)));
        assert_eq!(engine.locate(journey(2)), Err(PoolingError::NotFound(2)));
        assert_eq!(engine.stats(), EngineStats { cars: 1, active_journeys: 0, pending_journeys: 0, free_seats: 6 });
    }

    #[test]
    fn test_manage_journey_scenario() {
        let mut engine = engine_with(&[(1, 6), (2, 6)]);

        let assignment = engine.request_journey(JourneySpec::new(5, 3)).unwrap();
        assert_eq!(assignment, Assignment::Assigned(car(1)));
        assert_eq!(
            engine.locate(journey(5)).unwrap(),
            Some(CarView { id: 1, max_seats: 6, available_seats: 3 })
        );

        assert_eq!(engine.dropoff(journey(5)).unwrap(), Some(car(1)));
        assert_eq!(engine.reassign(car(1)), None);
        assert_eq!(engine.fleet()[0].available_seats, 6);
        assert_eq!(engine.locate(journey(5)), Err(PoolingError::NotFound(5)));
    }

    #[test]
    fn test_partially_occupied_car_not_offered_to_new_journey() {
        let mut engine = engine_with(&[(1, 6)]);
        engine.request_journey(JourneySpec::new(1, 2)).unwrap();

        let assignment = engine.request_journey(JourneySpec::new(2, 2)).unwrap();
        assert_eq!(assignment, Assignment::Unassigned);
        assert_eq!(engine.locate(journey(2)), Ok(None));
    }

    #[test]
    fn test_oversized_group_waits() {
        let mut engine = engine_with(&[(1, 4), (2, 5)]);
        let assignment = engine.request_journey(JourneySpec::new(1, 6)).unwrap();
        assert_eq!(assignment, Assignment::Unassigned);
        assert_eq!(engine.stats().pending_journeys, 1);
    }

    #[test]
    fn test_request_journey_validation() {
        let mut engine = engine_with(&[(1, 4)]);
        assert!(matches!(
            engine.request_journey(JourneySpec::new(1, 0)),
            Err(PoolingError::InvalidCapacity(_))
        ));
        assert!(matches!(
            engine.request_journey(JourneySpec::new(1, 7)),
            Err(PoolingError::InvalidCapacity(_))
        ));
        assert!(matches!(
            engine.request_journey(JourneySpec::new(-3, 2)),
            Err(PoolingError::InvalidArgument(_))
        ));
        assert_eq!(engine.stats().pending_journeys + engine.stats().active_journeys, 0);
    }

    #[test]
    fn test_duplicate_journey_rejected_active_or_pending() {
        let mut engine = engine_with(&[(1, 4)]);
        engine.request_journey(JourneySpec::new(1, 4)).unwrap();
        engine.request_journey(JourneySpec::new(2, 4)).unwrap();

        assert_eq!(engine.request_journey(JourneySpec::new(1, 1)), Err(PoolingError::DuplicateId(1)));
        assert_eq!(engine.request_journey(JourneySpec::new(2, 1)), Err(PoolingError::DuplicateId(2)));
        assert_eq!(engine.stats().pending_journeys, 1);
    }

    #[test]
    fn test_pending_reevaluated_before_new_journey() {
        let mut engine = engine_with(&[(1, 4)]);
        engine.request_journey(JourneySpec::new(1, 4)).unwrap();
        engine.request_journey(JourneySpec::new(2, 3)).unwrap();

        // Free the car without reassigning, so journey 2 is still queued.
        assert_eq!(engine.dropoff(journey(1)).unwrap(), Some(car(1)));
        assert_eq!(engine.locate(journey(2)), Ok(None));

        // Journey 3 arrives; the older journey 2 gets the empty car first.
        let assignment = engine.request_journey(JourneySpec::new(3, 1)).unwrap();
        assert_eq!(assignment, Assignment::Unassigned);
        assert_eq!(engine.locate(journey(2)).unwrap().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_dropoff_pending_frees_nothing() {
        let mut engine = engine_with(&[(1, 4)]);
        engine.request_journey(JourneySpec::new(1, 4)).unwrap();
        engine.request_journey(JourneySpec::new(2, 2)).unwrap();

        assert_eq!(engine.dropoff(journey(2)), Ok(None));
        assert_eq!(engine.stats().pending_journeys, 0);
        assert_eq!(engine.dropoff(journey(2)), Err(PoolingError::NotFound(2)));
    }

    #[test]
    fn test_reassign_promotes_earliest_fitting_journey() {
        let mut engine = engine_with(&[(1, 6)]);
        engine.request_journey(JourneySpec::new(1, 6)).unwrap();
        engine.request_journey(JourneySpec::new(2, 5)).unwrap();
        engine.request_journey(JourneySpec::new(3, 4)).unwrap();

        let freed = engine.dropoff(journey(1)).unwrap().unwrap();
        assert_eq!(engine.reassign(freed), Some(journey(2)));
        assert_eq!(engine.locate(journey(3)), Ok(None));
    }

    #[test]
    fn test_reassign_uses_partial_fit() {
        let mut engine = engine_with(&[(1, 6)]);
        engine.request_journey(JourneySpec::new(1, 3)).unwrap();
        engine.request_journey(JourneySpec::new(2, 3)).unwrap();
        engine.request_journey(JourneySpec::new(3, 5)).unwrap();
        engine.request_journey(JourneySpec::new(4, 2)).unwrap();

        // Journey 1 rides car 1; journeys 2, 3 and 4 are queued.
        let freed = engine.dropoff(journey(1)).unwrap().unwrap();
        assert_eq!(engine.reassign(freed), Some(journey(2)));
        assert_eq!(engine.fleet()[0].available_seats, 3);

        // Car 1 is now partially occupied. Journey 3 (5) does not fit but the
        // later journey 4 (2) does.
        assert_eq!(engine.reassign(freed), Some(journey(4)));
        assert_eq!(engine.fleet()[0].available_seats, 1);
        assert_eq!(engine.locate(journey(3)), Ok(None));

        // Nothing else fits.
        assert_eq!(engine.reassign(freed), None);
        assert_eq!(engine.check_invariants(), Ok(()));
    }

    #[test]
    fn test_reassign_unknown_car_is_noop() {
        let mut engine = engine_with(&[(1, 4)]);
        engine.request_journey(JourneySpec::new(1, 6)).unwrap();
        assert_eq!(engine.reassign(car(42)), None);
        assert_eq!(engine.stats().pending_journeys, 1);
    }

    #[test]
    fn test_lowest_car_id_wins_tie() {
        let mut engine = engine_with(&[(7, 5), (3, 5), (5, 5)]);
        let assignment = engine.request_journey(JourneySpec::new(1, 2)).unwrap();
        assert_eq!(assignment, Assignment::Assigned(car(3)));
    }

    #[test]
    fn test_journeys_snapshot_order() {
        let mut engine = engine_with(&[(1, 4), (2, 4)]);
        engine.request_journey(JourneySpec::new(9, 4)).unwrap();
        engine.request_journey(JourneySpec::new(4, 4)).unwrap();
        engine.request_journey(JourneySpec::new(8, 3)).unwrap();
        engine.request_journey(JourneySpec::new(6, 1)).unwrap();

        let views = engine.journeys();
        let ids: Vec<u32> = views.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![4, 9, 8, 6]);
        assert_eq!(views[2].state, JourneyState::Pending);
        assert_eq!(views[0].car, Some(2));
    }
}
