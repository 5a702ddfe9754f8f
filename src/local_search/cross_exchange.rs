//! Cross-route exchange: swap a segment of one route with a segment of another.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Interrupted;
use crate::problem::Problem;
use crate::solution::TourMatrix;

use super::utils::{build_cross_route, node_after, IMPROVEMENT_EPSILON};
use super::LocalSearch;

/// Cut points of the best exchange found for a route pair.
#[derive(Clone, Copy)]
struct CrossMove {
    x1: usize,
    y1: usize,
    x2: usize,
    y2: usize,
}

impl LocalSearch {
    /// Best-improvement segment exchange for every pair of routes.
    ///
    /// For routes `r1` and `r2` the segments `r1[x1+1..=y1]` and
    /// `r2[x2+1..=y2]` trade places. At most one exchange, the most improving
    /// feasible one, is applied per route pair. Returns the updated distance.
    pub fn cross_exchange(
        &mut self,
        problem: &Problem,
        tours: &mut TourMatrix,
        distance: f64,
        stop: &AtomicBool,
    ) -> Result<f64, Interrupted> {
        let depot = problem.depot_index();
        let mut total = distance;
        let vehicle_count = tours.tours.len();

        for r1 in 0..vehicle_count {
            for r2 in (r1 + 1)..vehicle_count {
                let (head, tail) = tours.tours.split_at_mut(r2);
                let first = &mut head[r1].customers;
                let second = &mut tail[0].customers;

                if first.len() < 2 || second.len() < 2 {
                    continue;
                }

                let mut best_diff = -IMPROVEMENT_EPSILON;
                let mut best_move = None;

                for x1 in 0..first.len() - 1 {
                    for x2 in 0..second.len() - 1 {
                        if stop.load(Ordering::Relaxed) {
                            return Err(Interrupted);
                        }

                        let diff1 = problem.distance(first[x1], second[x2 + 1])
                            + problem.distance(second[x2], first[x1 + 1])
                            - problem.distance(first[x1], first[x1 + 1])
                            - problem.distance(second[x2], second[x2 + 1]);
                        if diff1 >= 0.0 {
                            continue;
                        }

                        for y1 in (x1 + 1)..first.len() {
                            for y2 in (x2 + 1)..second.len() {
                                if stop.load(Ordering::Relaxed) {
                                    return Err(Interrupted);
                                }

                                let y1_next = node_after(first, y1, depot);
                                let y2_next = node_after(second, y2, depot);
                                let diff2 = problem.distance(first[y1], y2_next)
                                    + problem.distance(second[y2], y1_next)
                                    - problem.distance(first[y1], y1_next)
                                    - problem.distance(second[y2], y2_next);
                                if diff2 > 0.0 {
                                    continue;
                                }

                                let diff = diff1 + diff2;
                                if diff >= best_diff {
                                    continue;
                                }

                                build_cross_route(
                                    first,
                                    second,
                                    x1,
                                    y1,
                                    x2,
                                    y2,
                                    &mut self.temp_first,
                                );
                                if problem.check_route(&self.temp_first).is_none() {
                                    continue;
                                }
                                build_cross_route(
                                    second,
                                    first,
                                    x2,
                                    y2,
                                    x1,
                                    y1,
                                    &mut self.temp_second,
                                );
                                if problem.check_route(&self.temp_second).is_none() {
                                    continue;
                                }

                                best_diff = diff;
                                best_move = Some(CrossMove { x1, y1, x2, y2 });
                            }
                        }
                    }
                }

                if let Some(CrossMove { x1, y1, x2, y2 }) = best_move {
                    build_cross_route(first, second, x1, y1, x2, y2, &mut self.temp_first);
                    build_cross_route(second, first, x2, y2, x1, y1, &mut self.temp_second);
                    first.clone_from(&self.temp_first);
                    second.clone_from(&self.temp_second);
                    total += best_diff;
                }
            }
        }

        Ok(total)
    }
}
