//! The two cooperating ant colonies of MACS-VRPTW.
//!
//! The vehicle-minimizing colony searches for any feasible solution with one
//! vehicle less than the best known. The distance-minimizing colony searches
//! for shorter solutions with the best known vehicle count. Both build
//! solutions with ants guided by their private pheromone trails and report
//! through [`SharedSearchState`].

pub mod ant;
pub mod pheromone;
pub mod shared;

use log::debug;
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::error::VrptwError;
use crate::insertion::Insertion;
use crate::local_search::LocalSearch;
use crate::problem::Problem;
use crate::solution::{Tour, TourMatrix};

use self::ant::AntOutcome;
use self::pheromone::PheromoneMatrix;
pub use self::shared::{BestSoFar, SharedSearchState};

/// Objective of a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColonyKind {
    /// ACS-VEI: reduce the number of vehicles
    VehicleMinimizing,
    /// ACS-TIME: reduce the total distance
    DistanceMinimizing,
}

impl ColonyKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColonyKind::VehicleMinimizing => "acs-vei",
            ColonyKind::DistanceMinimizing => "acs-time",
        }
    }
}

/// A colony with all of its private working state.
pub struct Colony<'p> {
    kind: ColonyKind,
    problem: &'p Problem,
    ants_count: usize,
    beta: i32,
    q0: f64,
    rho: f64,
    xi: f64,
    /// Vehicles an ant may use
    budget: usize,
    pheromones: PheromoneMatrix,
    /// Visit flags over customers and duplicated depots
    visited: Vec<bool>,
    scores: Vec<f64>,
    /// Per-customer count of failed visits (vehicle-minimizing colony only)
    avoidance: Vec<u32>,
    /// Tours of the ant currently under construction
    tours: TourMatrix,
    insertion: Insertion,
    local_search: LocalSearch,
    rng: ChaCha8Rng,
}

impl<'p> Colony<'p> {
    /// Set up a colony for the current best vehicle count.
    ///
    /// The pheromone matrix spans all customers plus one duplicated depot per
    /// vehicle of the best solution, so the best-so-far tours can always be
    /// reinforced; ants only use the first `budget` duplicated depots.
    pub fn new(
        kind: ColonyKind,
        problem: &'p Problem,
        config: &Config,
        best_vehicle_count: usize,
        seed_distance: f64,
        rng: ChaCha8Rng,
    ) -> Result<Self, VrptwError> {
        let budget = match kind {
            ColonyKind::VehicleMinimizing => best_vehicle_count.saturating_sub(1),
            ColonyKind::DistanceMinimizing => best_vehicle_count,
        };
        if budget == 0 {
            return Err(VrptwError::Configuration(format!(
                "{} colony needs at least one vehicle",
                kind.name()
            )));
        }

        let n = problem.customer_count();
        let nodes = n + budget;
        let seed_distance = if seed_distance > 0.0 {
            seed_distance
        } else {
            1.0
        };
        let tau0 = 1.0 / (nodes as f64 * seed_distance);
        let pheromones = PheromoneMatrix::new(n + best_vehicle_count, tau0)?;

        Ok(Colony {
            kind,
            problem,
            ants_count: config.ants_count,
            beta: config.beta,
            q0: config.q0,
            rho: config.rho,
            xi: config.xi,
            budget,
            pheromones,
            visited: vec![false; nodes],
            scores: vec![0.0; nodes],
            avoidance: vec![0; n],
            tours: TourMatrix {
                tours: Vec::with_capacity(budget),
            },
            insertion: Insertion::new(n),
            local_search: LocalSearch::new(n),
            rng,
        })
    }

    pub fn kind(&self) -> ColonyKind {
        self.kind
    }

    /// Vehicles available to each ant.
    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn pheromones(&self) -> &PheromoneMatrix {
        &self.pheromones
    }

    /// Search until a qualifying improvement is published or a stop is requested.
    pub fn run(&mut self, shared: &SharedSearchState<'_>) {
        debug!("{} colony started with {} vehicles", self.kind.name(), self.budget);
        match self.kind {
            ColonyKind::VehicleMinimizing => self.run_vehicle_minimizing(shared),
            ColonyKind::DistanceMinimizing => self.run_distance_minimizing(shared),
        }
        debug!("{} colony finished", self.kind.name());
    }

    fn run_vehicle_minimizing(&mut self, shared: &SharedSearchState<'_>) {
        let n = self.problem.customer_count();

        // reference: best partial coverage seen so far
        let mut reference = TourMatrix::new();
        {
            let best = shared.best();
            reference
                .tours
                .extend(best.tours.tours.iter().take(self.budget).cloned());
        }
        let mut reference_distance: f64 = reference
            .tours
            .iter()
            .map(|tour| self.problem.route_distance(&tour.customers))
            .sum();
        let mut reference_covered = reference.customer_count();
        let mut batches = 0u64;

        loop {
            let mut coverage_improved = false;

            for _ in 0..self.ants_count {
                if shared.should_stop() {
                    return;
                }

                match self.construct_ant(shared.stop_flag()) {
                    AntOutcome::Interrupted => return,
                    AntOutcome::Feasible {
                        vehicle_count,
                        distance,
                    } => {
                        self.publish_fewer_vehicles(shared, vehicle_count, distance);
                        return;
                    }
                    AntOutcome::Infeasible { distance } => {
                        let mut covered = 0;
                        for customer in 0..n {
                            if self.visited[customer] {
                                covered += 1;
                            } else {
                                self.avoidance[customer] += 1;
                            }
                        }
                        if covered > reference_covered {
                            coverage_improved = true;
                            reference_covered = covered;
                            reference_distance = distance;
                            reference.clone_from(&self.tours);
                        }
                    }
                }
            }

            if coverage_improved {
                self.avoidance.fill(0);
            }

            self.pheromones
                .global_update(&reference, reference_distance, self.rho);
            if shared.should_stop() {
                return;
            }
            {
                let best = shared.best();
                self.pheromones
                    .global_update(&best.tours, best.distance, self.rho);
            }

            batches += 1;
            debug!(
                "acs-vei batch {}: best coverage {}/{} customers",
                batches, reference_covered, n
            );
        }
    }

    fn run_distance_minimizing(&mut self, shared: &SharedSearchState<'_>) {
        let mut batch_best = TourMatrix::new();
        let mut batches = 0u64;

        loop {
            let mut batch_distance: Option<f64> = None;

            for _ in 0..self.ants_count {
                if shared.should_stop() {
                    return;
                }

                match self.construct_ant(shared.stop_flag()) {
                    AntOutcome::Interrupted => return,
                    AntOutcome::Infeasible { .. } => continue,
                    AntOutcome::Feasible {
                        vehicle_count,
                        distance,
                    } => {
                        if vehicle_count < self.budget {
                            self.publish_fewer_vehicles(shared, vehicle_count, distance);
                            return;
                        }
                        if batch_distance.map_or(true, |best| distance < best) {
                            batch_distance = Some(distance);
                            batch_best.clone_from(&self.tours);
                            batch_best.renumber_depots(self.problem.customer_count());
                        }
                    }
                }
            }

            if shared.should_stop() {
                return;
            }

            if let Some(distance) = batch_distance {
                shared.publish_shorter(self.budget, distance, &batch_best);
            }

            {
                let best = shared.best();
                self.pheromones
                    .global_update(&best.tours, best.distance, self.rho);
            }

            batches += 1;
            debug!("acs-time batch {} done", batches);
        }
    }

    /// Publish the current ant with vehicle `i` on depot `N + i`. The next
    /// round's pheromone matrix only spans the new vehicle count.
    fn publish_fewer_vehicles(
        &mut self,
        shared: &SharedSearchState<'_>,
        vehicle_count: usize,
        distance: f64,
    ) {
        self.tours.renumber_depots(self.problem.customer_count());
        shared.publish_fewer_vehicles(vehicle_count, distance, &self.tours);
    }

    /// Start a fresh tour matrix for an ant.
    fn reset_ant(&mut self) {
        self.visited.fill(false);
        self.tours.tours.clear();
    }

    /// Close the current route and add it to the ant's tours.
    fn close_tour(&mut self, tour: Tour) {
        self.tours.tours.push(tour);
    }
}
