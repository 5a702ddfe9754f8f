//! Local search operators for the MACS-VRPTW algorithm.
//!
//! Both operators work in place on a [`TourMatrix`], keep every route
//! feasible, only ever shorten the total distance, and poll a shared stop flag
//! so a colony can be cancelled in the middle of a scan.

pub mod cross_exchange;
pub mod intra_exchange;
pub mod utils;

use std::sync::atomic::AtomicBool;

use crate::error::{Interrupted, VrptwError};
use crate::problem::Problem;
use crate::solution::{Solution, TourMatrix};

/// Scratch buffers shared by the local search operators.
pub struct LocalSearch {
    /// Candidate rebuild of the first route of a cross exchange
    temp_first: Vec<usize>,
    /// Candidate rebuild of the second route of a cross exchange
    temp_second: Vec<usize>,
}

impl LocalSearch {
    /// Create a new local search instance sized for the given problem.
    pub fn new(customer_count: usize) -> Self {
        LocalSearch {
            temp_first: Vec::with_capacity(customer_count),
            temp_second: Vec::with_capacity(customer_count),
        }
    }

    /// Apply intra-route exchange followed by cross-route exchange.
    pub fn improve_tours(
        &mut self,
        problem: &Problem,
        tours: &mut TourMatrix,
        distance: f64,
        stop: &AtomicBool,
    ) -> Result<f64, Interrupted> {
        let distance = self.intra_exchange(problem, tours, distance, stop)?;
        self.cross_exchange(problem, tours, distance, stop)
    }

    /// Intra-route exchange on a flat solution.
    pub fn intra_exchange_solution(
        &mut self,
        problem: &Problem,
        solution: &Solution,
    ) -> Result<Solution, VrptwError> {
        self.apply_flat(problem, solution, |ls, problem, tours, distance, stop| {
            ls.intra_exchange(problem, tours, distance, stop)
        })
    }

    /// Cross-route exchange on a flat solution.
    pub fn cross_exchange_solution(
        &mut self,
        problem: &Problem,
        solution: &Solution,
    ) -> Result<Solution, VrptwError> {
        self.apply_flat(problem, solution, |ls, problem, tours, distance, stop| {
            ls.cross_exchange(problem, tours, distance, stop)
        })
    }

    /// Run both operators on the problem's stored solution and write it back.
    pub fn improve(&mut self, problem: &mut Problem) -> Result<(), VrptwError> {
        let current = problem.solution.as_ref().ok_or_else(|| {
            VrptwError::Configuration("problem has no solution to improve".to_string())
        })?;
        let improved = self.apply_flat(problem, current, |ls, problem, tours, distance, stop| {
            ls.improve_tours(problem, tours, distance, stop)
        })?;
        problem.set_solution(improved);
        Ok(())
    }

    fn apply_flat<F>(
        &mut self,
        problem: &Problem,
        solution: &Solution,
        operator: F,
    ) -> Result<Solution, VrptwError>
    where
        F: FnOnce(&mut Self, &Problem, &mut TourMatrix, f64, &AtomicBool) -> Result<f64, Interrupted>,
    {
        let mut tours = solution.to_tour_matrix(problem.customer_count())?;
        let stop = AtomicBool::new(false);
        let distance = operator(self, problem, &mut tours, solution.distance, &stop)
            .map_err(|_| VrptwError::Configuration("local search interrupted".to_string()))?;
        Ok(Solution::from_tour_matrix(&tours, distance))
    }
}
