//! Pheromone trails over customers and duplicated depots.

use crate::error::VrptwError;
use crate::solution::TourMatrix;

/// Square matrix of arc desirabilities, stored row-major in a flat arena.
#[derive(Debug, Clone)]
pub struct PheromoneMatrix {
    size: usize,
    tau0: f64,
    values: Vec<f64>,
}

impl PheromoneMatrix {
    /// Create a `size × size` matrix filled with `tau0`.
    pub fn new(size: usize, tau0: f64) -> Result<Self, VrptwError> {
        let cells = size.checked_mul(size).ok_or(VrptwError::Allocation {
            what: "pheromone matrix",
        })?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(cells)
            .map_err(|_| VrptwError::Allocation {
                what: "pheromone matrix",
            })?;
        values.resize(cells, tau0);
        Ok(PheromoneMatrix { size, tau0, values })
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[from * self.size + to]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tau0(&self) -> f64 {
        self.tau0
    }

    /// Pull a traversed arc back towards the initial level.
    #[inline]
    pub fn local_update(&mut self, from: usize, to: usize, xi: f64) {
        let cell = &mut self.values[from * self.size + to];
        *cell = (1.0 - xi) * *cell + xi * self.tau0;
    }

    /// Evaporate and reinforce every arc of a solution.
    ///
    /// Routes are chained through their duplicated depots: the last customer
    /// of a route links to the depot of the next route, and the final route
    /// closes back to the depot of the first.
    pub fn global_update(&mut self, tours: &TourMatrix, length: f64, rho: f64) {
        let Some(first) = tours.tours.first() else {
            return;
        };
        let deposit = if length > 0.0 { rho / length } else { 0.0 };

        let mut last = first.depot;
        for (i, tour) in tours.tours.iter().enumerate() {
            for &customer in &tour.customers {
                self.reinforce(last, customer, rho, deposit);
                last = customer;
            }
            let next = tours.tours.get(i + 1).map_or(first.depot, |t| t.depot);
            self.reinforce(last, next, rho, deposit);
            last = next;
        }
    }

    #[inline]
    fn reinforce(&mut self, from: usize, to: usize, rho: f64, deposit: f64) {
        let cell = &mut self.values[from * self.size + to];
        *cell = (1.0 - rho) * *cell + deposit;
    }
}
