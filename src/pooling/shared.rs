//! Lock boundary around the allocation engine.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::observability::metrics;
use crate::pooling::engine::Engine;
use crate::pooling::error::PoolingResult;
use crate::pooling::types::{
    Assignment, CarId, CarSpec, CarView, EngineStats, JourneyId, JourneySpec, JourneyView,
};

/// Cloneable handle to one engine. Every operation holds the lock for its
/// whole duration, so operations never interleave.
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_fleet(&self, cars: Vec<CarSpec>) -> PoolingResult<()> {
        let mut engine = self.lock();
        let result = engine.reset_fleet(cars);
        publish(&engine);
        result
    }

    pub fn request_journey(&self, spec: JourneySpec) -> PoolingResult<Assignment> {
        let mut engine = self.lock();
        let result = engine.request_journey(spec);
        publish(&engine);
        result
    }

    /// Drop off a journey without reassigning the freed car.
    pub fn dropoff(&self, id: JourneyId) -> PoolingResult<Option<CarId>> {
        let mut engine = self.lock();
        let result = engine.dropoff(id);
        publish(&engine);
        result
    }

    pub fn reassign(&self, car: CarId) -> Option<JourneyId> {
        let mut engine = self.lock();
        let promoted = engine.reassign(car);
        publish(&engine);
        promoted
    }

    /// Drop off a journey and offer the freed seats to the pending queue,
    /// under one lock acquisition. Returns the promoted journey, if any.
    pub fn dropoff_and_reassign(&self, id: JourneyId) -> PoolingResult<Option<JourneyId>> {
        let mut engine = self.lock();
        let promoted = match engine.dropoff(id) {
            Ok(Some(car)) => Ok(engine.reassign(car)),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        publish(&engine);
        promoted
    }

    pub fn locate(&self, id: JourneyId) -> PoolingResult<Option<CarView>> {
        self.lock().locate(id)
    }

    pub fn fleet(&self) -> Vec<CarView> {
        self.lock().fleet()
    }

    pub fn journeys(&self) -> Vec<JourneyView> {
        self.lock().journeys()
    }

    pub fn stats(&self) -> EngineStats {
        self.lock().stats()
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        self.lock().check_invariants()
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        self.inner.lock().expect("allocation engine mutex poisoned")
    }
}

fn publish(engine: &Engine) {
    metrics::record_engine_stats(&engine.stats());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pooling::PoolingError;

    #[test]
    fn test_dropoff_and_reassign() {
        let engine = SharedEngine::new();
        engine
            .reset_fleet(vec![CarSpec::new(1, 4)])
            .unwrap();
        engine.request_journey(JourneySpec::new(1, 4)).unwrap();
        engine.request_journey(JourneySpec::new(2, 3)).unwrap();

        let j1 = JourneyId::try_from(1).unwrap();
        let j2 = JourneyId::try_from(2).unwrap();
        assert_eq!(engine.dropoff_and_reassign(j1), Ok(Some(j2)));
        assert_eq!(engine.locate(j2).unwrap().map(|c| c.available_seats), Some(1));
        assert_eq!(engine.dropoff_and_reassign(j1), Err(PoolingError::NotFound(1)));
        assert_eq!(engine.check_invariants(), Ok(()));
    }

    #[test]
    fn test_clones_share_state() {
        let engine = SharedEngine::new();
        let other = engine.clone();
        engine.reset_fleet(vec![CarSpec::new(3, 5)]).unwrap();
        assert_eq!(other.fleet().len(), 1);
    }
}
