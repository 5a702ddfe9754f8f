//! State shared by the colonies and the orchestrator.

use log::info;
use parking_lot::{Condvar, Mutex, RwLock, RwLockReadGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::logger::SolutionLogger;
use crate::solution::TourMatrix;

/// The best feasible solution published so far.
#[derive(Debug, Clone, PartialEq)]
pub struct BestSoFar {
    pub vehicle_count: usize,
    pub distance: f64,
    pub tours: TourMatrix,
}

/// Best-so-far solution, stop flag and improvement signal.
///
/// `best` only changes through [`publish_fewer_vehicles`] and
/// [`publish_shorter`], which re-check the current value under the write
/// lock, so published results are strictly improving.
///
/// [`publish_fewer_vehicles`]: SharedSearchState::publish_fewer_vehicles
/// [`publish_shorter`]: SharedSearchState::publish_shorter
pub struct SharedSearchState<'a> {
    best: RwLock<BestSoFar>,
    stop: AtomicBool,
    improved: Mutex<bool>,
    signal: Condvar,
    logger: Option<&'a SolutionLogger>,
    seed_distance: f64,
}

impl<'a> SharedSearchState<'a> {
    pub fn new(best: BestSoFar, logger: Option<&'a SolutionLogger>) -> Self {
        let seed_distance = best.distance;
        SharedSearchState {
            best: RwLock::new(best),
            stop: AtomicBool::new(false),
            improved: Mutex::new(false),
            signal: Condvar::new(),
            logger,
            seed_distance,
        }
    }

    /// Distance of the solution the search started from.
    pub fn seed_distance(&self) -> f64 {
        self.seed_distance
    }

    /// Read access to the best-so-far solution.
    pub fn best(&self) -> RwLockReadGuard<'_, BestSoFar> {
        self.best.read()
    }

    pub fn snapshot(&self) -> BestSoFar {
        self.best.read().clone()
    }

    pub fn vehicle_count(&self) -> usize {
        self.best.read().vehicle_count
    }

    /// Publish a solution using fewer vehicles than the current best and wake
    /// the orchestrator. Returns `false` if an equal or better vehicle count
    /// was published first.
    pub fn publish_fewer_vehicles(
        &self,
        vehicle_count: usize,
        distance: f64,
        tours: &TourMatrix,
    ) -> bool {
        {
            let mut best = self.best.write();
            if vehicle_count >= best.vehicle_count {
                return false;
            }
            best.vehicle_count = vehicle_count;
            best.distance = distance;
            best.tours.clone_from(tours);
            if let Some(logger) = self.logger {
                logger.add(vehicle_count, distance, tours);
            }
        }

        info!(
            "New best solution: {} vehicles, distance {:.2}",
            vehicle_count, distance
        );

        let mut improved = self.improved.lock();
        *improved = true;
        self.signal.notify_one();
        true
    }

    /// Publish a strictly shorter solution with the current vehicle count.
    pub fn publish_shorter(
        &self,
        vehicle_count: usize,
        distance: f64,
        tours: &TourMatrix,
    ) -> bool {
        {
            let mut best = self.best.write();
            if vehicle_count != best.vehicle_count || distance >= best.distance {
                return false;
            }
            best.distance = distance;
            best.tours.clone_from(tours);
            if let Some(logger) = self.logger {
                logger.add(vehicle_count, distance, tours);
            }
        }

        info!(
            "New best solution: {} vehicles, distance {:.2}",
            vehicle_count, distance
        );
        true
    }

    /// Block until a colony publishes fewer vehicles or the deadline passes.
    /// Returns whether an improvement was signalled.
    pub fn wait_for_improvement(&self, deadline: Instant) -> bool {
        let mut improved = self.improved.lock();
        while !*improved {
            if self.signal.wait_until(&mut improved, deadline).timed_out() {
                break;
            }
        }
        *improved
    }

    /// Clear the stop flag and the improvement signal before a new round.
    pub fn reset_round(&self) {
        *self.improved.lock() = false;
        self.stop.store(false, Ordering::SeqCst);
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// The flag polled by the search operators.
    pub fn stop_flag(&self) -> &AtomicBool {
        &self.stop
    }

    pub fn into_best(self) -> BestSoFar {
        self.best.into_inner()
    }
}
