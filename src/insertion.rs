//! Greedy insertion of customers an ant failed to route.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Interrupted;
use crate::problem::Problem;
use crate::solution::TourMatrix;

/// Working tables for the insertion procedure.
pub struct Insertion {
    /// Customers still to place, largest demand first
    pending: Vec<usize>,
    /// Latest feasible arrival per route position
    latest: Vec<f64>,
}

impl Insertion {
    pub fn new(customer_count: usize) -> Self {
        Insertion {
            pending: Vec::with_capacity(customer_count),
            latest: Vec::with_capacity(customer_count),
        }
    }

    /// Splice every unvisited customer into a time-feasible gap.
    ///
    /// Customers are tried in descending demand order. Routes are scanned in
    /// order, gaps from the depot onward; after each insertion the same route
    /// is scanned again with refreshed tables. `visited` and `distance` are
    /// updated for every customer placed, even when the procedure fails to
    /// place all of them. Returns whether every customer was placed.
    pub fn insert_unrouted(
        &mut self,
        problem: &Problem,
        visited: &mut [bool],
        tours: &mut TourMatrix,
        distance: &mut f64,
        stop: &AtomicBool,
    ) -> Result<bool, Interrupted> {
        self.pending.clear();
        self.pending.extend((0..problem.customer_count()).filter(|&i| !visited[i]));
        if self.pending.is_empty() {
            return Ok(true);
        }
        self.pending
            .sort_by(|&a, &b| problem.customers[b].demand.cmp(&problem.customers[a].demand));

        let depot = problem.depot_index();
        let depot_due = problem.depot.due_date;
        let mut route_index = 0;

        while route_index < tours.tours.len() {
            let route = &mut tours.tours[route_index].customers;

            let load: u32 = route.iter().map(|&c| problem.customers[c].demand).sum();
            let free_capacity = problem.capacity.saturating_sub(load);

            self.latest.clear();
            self.latest.resize(route.len(), 0.0);
            let mut latest = depot_due;
            let mut next = depot;
            for (pos, &customer) in route.iter().enumerate().rev() {
                let c = &problem.customers[customer];
                latest -= problem.distance(customer, next);
                latest = (latest - c.service_time).min(c.due_date);
                self.latest[pos] = latest;
                next = customer;
            }

            let mut inserted = None;
            let mut earliest_start = 0.0;
            let mut last = depot;

            'gaps: for gap in 0..=route.len() {
                let (next, next_latest) = if gap == route.len() {
                    (depot, depot_due)
                } else {
                    (route[gap], self.latest[gap])
                };

                for (k, &candidate) in self.pending.iter().enumerate() {
                    if stop.load(Ordering::Relaxed) {
                        return Err(Interrupted);
                    }

                    let c = &problem.customers[candidate];
                    if c.demand > free_capacity {
                        continue;
                    }
                    let arrival = earliest_start + problem.distance(last, candidate);
                    if arrival > c.due_date {
                        continue;
                    }
                    let finish = arrival.max(c.ready_time) + c.service_time;
                    if finish + problem.distance(candidate, next) > next_latest {
                        continue;
                    }

                    route.insert(gap, candidate);
                    *distance += problem.distance(last, candidate)
                        + problem.distance(candidate, next)
                        - problem.distance(last, next);
                    visited[candidate] = true;
                    inserted = Some(k);
                    break 'gaps;
                }

                if next != depot {
                    let n = &problem.customers[next];
                    earliest_start = (earliest_start + problem.distance(last, next))
                        .max(n.ready_time)
                        + n.service_time;
                    last = next;
                }
            }

            match inserted {
                Some(k) => {
                    self.pending.remove(k);
                    if self.pending.is_empty() {
                        return Ok(true);
                    }
                }
                None => route_index += 1,
            }
        }

        Ok(false)
    }
}
