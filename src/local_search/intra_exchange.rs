//! Intra-route exchange: swap two customers of the same route.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Interrupted;
use crate::problem::Problem;
use crate::solution::TourMatrix;

use super::utils::{node_after, node_before, IMPROVEMENT_EPSILON};
use super::LocalSearch;

impl LocalSearch {
    /// First-improvement position swaps within each route.
    ///
    /// After an accepted swap the scan of that route starts over; a route is
    /// done once a full pass finds nothing. Returns the updated distance.
    pub fn intra_exchange(
        &mut self,
        problem: &Problem,
        tours: &mut TourMatrix,
        distance: f64,
        stop: &AtomicBool,
    ) -> Result<f64, Interrupted> {
        let depot = problem.depot_index();
        let mut total = distance;

        for tour in &mut tours.tours {
            let route = &mut tour.customers;
            let mut swapped = true;

            while swapped {
                swapped = false;

                'scan: for i in 0..route.len().saturating_sub(1) {
                    for j in (i + 1)..route.len() {
                        if stop.load(Ordering::Relaxed) {
                            return Err(Interrupted);
                        }

                        let delta = swap_delta(problem, route, i, j, depot);
                        if delta >= -IMPROVEMENT_EPSILON {
                            continue;
                        }

                        route.swap(i, j);
                        if problem.check_route(route).is_none() {
                            route.swap(i, j);
                            continue;
                        }

                        total += delta;
                        swapped = true;
                        break 'scan;
                    }
                }
            }
        }

        Ok(total)
    }
}

/// Change in route length from swapping positions `i < j`.
fn swap_delta(problem: &Problem, route: &[usize], i: usize, j: usize, depot: usize) -> f64 {
    let curr1 = route[i];
    let curr2 = route[j];
    let prev1 = node_before(route, i, depot);
    let next1 = route[i + 1];
    let prev2 = route[j - 1];
    let next2 = node_after(route, j, depot);

    let mut delta = problem.distance(prev1, curr2)
        + problem.distance(curr2, next1)
        + problem.distance(prev2, curr1)
        + problem.distance(curr1, next2)
        - problem.distance(prev1, curr1)
        - problem.distance(curr2, next2);

    // adjacent positions share the arc between them
    if i + 1 != j {
        delta -= problem.distance(curr1, next1) + problem.distance(prev2, curr2);
    }

    delta
}
