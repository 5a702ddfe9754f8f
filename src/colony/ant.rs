//! Probabilistic solution construction by a single ant.

use log::warn;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Colony, ColonyKind};
use crate::solution::Tour;

/// Result of one ant's construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AntOutcome {
    /// All customers served; the distance was re-proven by the problem
    Feasible { vehicle_count: usize, distance: f64 },
    /// Some customers could not be routed; `distance` covers the routed part
    Infeasible { distance: f64 },
    /// The stop flag was raised mid-construction
    Interrupted,
}

impl<'p> Colony<'p> {
    /// Build one candidate solution into `self.tours`.
    ///
    /// The ant starts from a random duplicated depot and repeatedly moves to
    /// a node chosen by pheromone and heuristic desirability. Visiting a
    /// duplicated depot closes the current route. Customers left over are
    /// handed to the insertion procedure; the distance-minimizing colony then
    /// applies local search.
    pub fn construct_ant(&mut self, stop: &AtomicBool) -> AntOutcome {
        let problem = self.problem;
        let n = problem.customer_count();
        let depot = problem.depot_index();

        self.reset_ant();

        let start = n + self.rng.gen_range(0..self.budget);
        let mut current = Tour::new(start);
        let mut last = start;
        let mut time = 0.0;
        let mut capacity = problem.capacity;
        let mut distance = 0.0;
        let mut routed = 0;

        loop {
            if stop.load(Ordering::Relaxed) {
                return AntOutcome::Interrupted;
            }

            let total = self.score_candidates(last, time, capacity);
            let Some(next) = self.choose_next(total) else {
                // nothing reachable: close what is open, drop an empty route
                if !current.is_empty() {
                    distance += problem.distance(last, depot);
                    self.close_tour(current);
                }
                break;
            };

            self.visited[next] = true;
            self.pheromones.local_update(last, next, self.xi);

            if next < n {
                let c = &problem.customers[next];
                let d = problem.distance(last, next);
                distance += d;
                time = (time + d).max(c.ready_time) + c.service_time;
                capacity -= c.demand;
                current.customers.push(next);
                routed += 1;
            } else {
                distance += problem.distance(last, depot);
                let finished = std::mem::replace(&mut current, Tour::new(next));
                self.close_tour(finished);

                if routed == n || self.tours.tours.len() >= self.budget {
                    break;
                }
                time = 0.0;
                capacity = problem.capacity;
            }

            last = next;
        }

        let placed = match self.insertion.insert_unrouted(
            problem,
            &mut self.visited[..n],
            &mut self.tours,
            &mut distance,
            stop,
        ) {
            Ok(placed) => placed,
            Err(_) => return AntOutcome::Interrupted,
        };
        if !placed {
            return AntOutcome::Infeasible { distance };
        }

        if self.kind == ColonyKind::DistanceMinimizing {
            distance = match self
                .local_search
                .improve_tours(problem, &mut self.tours, distance, stop)
            {
                Ok(distance) => distance,
                Err(_) => return AntOutcome::Interrupted,
            };
        }

        match problem.evaluate_tours(&self.tours) {
            Some(exact) => AntOutcome::Feasible {
                vehicle_count: self.tours.vehicle_count(),
                distance: exact,
            },
            None => {
                warn!(
                    "{} ant produced a solution rejected by the feasibility check",
                    self.kind.name()
                );
                AntOutcome::Infeasible { distance }
            }
        }
    }

    /// Fill `self.scores` for every node reachable from `last` and return
    /// their sum. Unreachable nodes score zero.
    fn score_candidates(&mut self, last: usize, time: f64, capacity: u32) -> f64 {
        let problem = self.problem;
        let n = problem.customer_count();
        let at_depot = last >= n;
        let mut total = 0.0;

        for node in 0..self.scores.len() {
            self.scores[node] = 0.0;
            if self.visited[node] {
                continue;
            }

            let eta = if node < n {
                let c = &problem.customers[node];
                if c.demand > capacity {
                    continue;
                }
                let arrival = time + problem.distance(last, node);
                if arrival > c.due_date {
                    continue;
                }
                let start = arrival.max(c.ready_time);
                if start + c.service_time + problem.depot_distance(node) > problem.depot.due_date {
                    continue;
                }
                let penalty = f64::from(self.avoidance[node]);
                1.0 / ((start - time) * (c.due_date - time) - penalty).max(1.0)
            } else {
                if at_depot {
                    continue;
                }
                let back = problem.depot_distance(last);
                1.0 / (back * (problem.depot.due_date - time)).max(1.0)
            };

            let score = self.pheromones.get(last, node) * eta.powi(self.beta);
            self.scores[node] = score;
            total += score;
        }

        total
    }

    /// Pick the next node: the best-scoring one with probability q0,
    /// otherwise a roulette draw proportional to the scores.
    fn choose_next(&mut self, total: f64) -> Option<usize> {
        if total <= 0.0 {
            return None;
        }

        if self.rng.gen::<f64>() < self.q0 {
            let mut best: Option<(usize, f64)> = None;
            for (node, &score) in self.scores.iter().enumerate() {
                if score > best.map_or(0.0, |(_, s)| s) {
                    best = Some((node, score));
                }
            }
            return best.map(|(node, _)| node);
        }

        let target = self.rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (node, &score) in self.scores.iter().enumerate() {
            if score <= 0.0 {
                continue;
            }
            chosen = Some(node);
            cumulative += score;
            if cumulative >= target {
                break;
            }
        }
        chosen
    }
}
