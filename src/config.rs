//! Configuration parameters for the MACS-VRPTW algorithm.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::construction::ConstructionHeuristic;
use crate::error::VrptwError;

/// Configuration settings for the MACS-VRPTW algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of ants built per colony batch
    pub ants_count: usize,
    /// Relative weight of the heuristic desirability against the pheromone (β)
    pub beta: i32,
    /// Probability of exploitation over biased exploration (q0)
    pub q0: f64,
    /// Global pheromone evaporation rate (ρ)
    pub rho: f64,
    /// Local pheromone evaporation rate (ξ)
    pub xi: f64,
    /// Wall-clock budget for the whole run
    pub time_limit: Duration,
    /// Seed for the random number generators; entropy when absent
    pub seed: Option<u64>,
    /// Heuristic producing the seed solution
    pub initial_heuristic: ConstructionHeuristic,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ants_count: 10,
            beta: 1,
            q0: 0.9,
            rho: 0.1,
            xi: 0.1,
            time_limit: Duration::from_secs(300),
            seed: None,
            initial_heuristic: ConstructionHeuristic::Gambardella1999,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the number of ants per batch.
    pub fn with_ants_count(mut self, ants: usize) -> Self {
        self.ants_count = ants;
        self
    }

    /// Set the heuristic exponent.
    pub fn with_beta(mut self, beta: i32) -> Self {
        self.beta = beta;
        self
    }

    /// Set the exploitation probability.
    pub fn with_q0(mut self, q0: f64) -> Self {
        self.q0 = q0;
        self
    }

    /// Set the global evaporation rate.
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    /// Set the local evaporation rate.
    pub fn with_xi(mut self, xi: f64) -> Self {
        self.xi = xi;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = duration;
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the heuristic used for the seed solution.
    pub fn with_initial_heuristic(mut self, heuristic: ConstructionHeuristic) -> Self {
        self.initial_heuristic = heuristic;
        self
    }

    /// Check that every parameter lies in its admissible range.
    pub fn validate(&self) -> Result<(), VrptwError> {
        if self.ants_count == 0 {
            return Err(VrptwError::Configuration(
                "ants count must be at least 1".to_string(),
            ));
        }
        if self.beta < 0 {
            return Err(VrptwError::Configuration(format!(
                "beta must be non-negative, got {}",
                self.beta
            )));
        }
        for (name, value) in [("q0", self.q0), ("rho", self.rho), ("xi", self.xi)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(VrptwError::Configuration(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.time_limit.is_zero() {
            return Err(VrptwError::Configuration(
                "time limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
