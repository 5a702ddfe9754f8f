//! # MACS-VRPTW
//!
//! A Rust implementation of the Multiple Ant Colony System for the Vehicle
//! Routing Problem with Time Windows (VRPTW).
//!
//! Based on the paper "MACS-VRPTW: A Multiple Ant Colony System for Vehicle
//! Routing Problems with Time Windows" by Gambardella, Taillard and Agazzi.
//!
//! Two colonies run concurrently: one tries to serve all customers with one
//! vehicle less than the best known solution, the other shortens the best
//! known solution at its vehicle count. Both share the best-so-far solution
//! and restart whenever the vehicle count drops.

pub mod colony;
pub mod config;
pub mod construction;
pub mod error;
pub mod insertion;
pub mod local_search;
pub mod logger;
pub mod problem;
pub mod solution;
pub mod utils;

use crate::colony::{BestSoFar, Colony, ColonyKind, SharedSearchState};
use crate::config::Config;
use crate::error::VrptwError;
use crate::logger::{ParameterValue, SolutionLogger};
use crate::problem::Problem;
use crate::solution::Solution;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::thread;
use std::time::{Duration, Instant};

/// Name recorded in run logs.
pub const ALGORITHM_NAME: &str = "MACS-VRPTW";

/// The main algorithm structure that orchestrates the two colonies.
pub struct MacsVrptw {
    pub problem: Problem,
    pub config: Config,
    pub logger: Option<SolutionLogger>,
    pub run_time: Duration,
    /// Number of times the colonies were relaunched with fewer vehicles
    pub restarts: u32,
}

impl MacsVrptw {
    /// Create a new MACS-VRPTW instance for the given problem and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        MacsVrptw {
            problem,
            config,
            logger: None,
            run_time: Duration::from_secs(0),
            restarts: 0,
        }
    }

    /// Record parameters and every published solution into `logger`.
    pub fn with_logger(mut self, logger: SolutionLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Run the search until the time limit expires.
    ///
    /// The returned solution is also stored in `self.problem.solution`.
    pub fn run(&mut self) -> Result<&Solution, VrptwError> {
        self.config.validate()?;
        let start_time = Instant::now();
        let deadline = start_time + self.config.time_limit;

        if let Some(logger) = self.logger.as_mut() {
            logger.start(ALGORITHM_NAME);
            let config = &self.config;
            let seconds = config.time_limit.as_secs() as i64;
            logger.add_parameter("calc_seconds", ParameterValue::Integer(seconds));
            logger.add_parameter(
                "ants_count",
                ParameterValue::Integer(config.ants_count as i64),
            );
            logger.add_parameter("beta", ParameterValue::Integer(i64::from(config.beta)));
            logger.add_parameter("q0", ParameterValue::Float(config.q0));
            logger.add_parameter("rho", ParameterValue::Float(config.rho));
            logger.add_parameter("xi", ParameterValue::Float(config.xi));
        }

        let heuristic = self.config.initial_heuristic;
        heuristic.construct(&mut self.problem)?;
        let seed = self.problem.solution.clone().ok_or_else(|| {
            VrptwError::Configuration("construction produced no solution".to_string())
        })?;
        let seed_tours = seed.to_tour_matrix(self.problem.customer_count())?;
        info!(
            "Seed solution ({}): {} vehicles, distance {:.2}",
            heuristic.name(),
            seed.vehicle_count,
            seed.distance
        );
        if let Some(logger) = self.logger.as_ref() {
            logger.add(seed.vehicle_count, seed.distance, &seed_tours);
        }

        let mut master_rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let best = {
            let problem = &self.problem;
            let config = &self.config;
            let shared = SharedSearchState::new(
                BestSoFar {
                    vehicle_count: seed.vehicle_count,
                    distance: seed.distance,
                    tours: seed_tours,
                },
                self.logger.as_ref(),
            );

            let mut restarts = 0;
            loop {
                let vehicles = shared.vehicle_count();
                if vehicles == 0 || Instant::now() >= deadline {
                    break;
                }

                shared.reset_round();
                let vei = if vehicles > 1 {
                    Some(Colony::new(
                        ColonyKind::VehicleMinimizing,
                        problem,
                        config,
                        vehicles,
                        shared.seed_distance(),
                        ChaCha8Rng::seed_from_u64(master_rng.gen()),
                    )?)
                } else {
                    None
                };
                let time = Colony::new(
                    ColonyKind::DistanceMinimizing,
                    problem,
                    config,
                    vehicles,
                    shared.seed_distance(),
                    ChaCha8Rng::seed_from_u64(master_rng.gen()),
                )?;

                if !run_round(&shared, vei, time, deadline)? {
                    break;
                }
                restarts += 1;
                debug!(
                    "Restarting colonies with {} vehicles",
                    shared.vehicle_count()
                );
            }

            self.restarts = restarts;
            shared.into_best()
        };

        self.run_time = start_time.elapsed();
        info!(
            "Search finished after {:.2?}: {} vehicles, distance {:.2}",
            self.run_time, best.vehicle_count, best.distance
        );

        self.problem
            .set_solution(Solution::from_tour_matrix(&best.tours, best.distance));
        self.problem.solution.as_ref().ok_or_else(|| {
            VrptwError::Configuration("solver finished without a solution".to_string())
        })
    }
}

/// Run both colonies until one of them publishes fewer vehicles or the
/// deadline passes. Returns whether the round ended on an improvement.
fn run_round(
    shared: &SharedSearchState<'_>,
    vei: Option<Colony<'_>>,
    time: Colony<'_>,
    deadline: Instant,
) -> Result<bool, VrptwError> {
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(2);

        let colonies = vei.into_iter().chain(std::iter::once(time));
        for mut colony in colonies {
            let name = format!("macs-{}", colony.kind().name().trim_start_matches("acs-"));
            let spawned = thread::Builder::new()
                .name(name)
                .spawn_scoped(scope, move || colony.run(shared));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    shared.request_stop();
                    return Err(VrptwError::WorkerCreation(err));
                }
            }
        }

        let improved = shared.wait_for_improvement(deadline);
        shared.request_stop();

        let mut panicked = false;
        for handle in handles {
            if handle.join().is_err() {
                panicked = true;
            }
        }
        if panicked {
            return Err(VrptwError::WorkerPanicked);
        }

        Ok(improved)
    })
}
