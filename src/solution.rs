//! Solution representation for the VRPTW.
//!
//! A solution exists in two equivalent encodings: a [`TourMatrix`] with one
//! row per vehicle, and a flat array where every vehicle's customer sequence
//! is terminated by [`TOUR_END`].

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VrptwError;

/// Sentinel terminating one vehicle's sequence in the flat encoding.
pub const TOUR_END: isize = -1;

/// The customers served by a single vehicle, in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    /// Customer ids (excluding the depot)
    pub customers: Vec<usize>,
    /// Duplicated depot node the tour starts from
    pub depot: usize,
}

impl Tour {
    /// Create an empty tour leaving from the given depot node.
    pub fn new(depot: usize) -> Self {
        Tour {
            customers: Vec::new(),
            depot,
        }
    }

    /// Number of customers on the tour.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

/// Per-vehicle view of a solution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourMatrix {
    pub tours: Vec<Tour>,
}

impl TourMatrix {
    pub fn new() -> Self {
        TourMatrix { tours: Vec::new() }
    }

    /// Decode a flat sentinel-terminated array.
    ///
    /// Vehicle `i` is tagged with the duplicated depot id `customer_count + i`.
    pub fn from_flat(
        vehicle_count: usize,
        flat: &[isize],
        customer_count: usize,
    ) -> Result<Self, VrptwError> {
        let mut tours = Vec::with_capacity(vehicle_count);
        let mut current = Tour::new(customer_count);

        for &entry in flat {
            if entry == TOUR_END {
                tours.push(current);
                current = Tour::new(customer_count + tours.len());
                continue;
            }
            if entry < 0 || entry as usize >= customer_count {
                return Err(VrptwError::InvalidSolution(format!(
                    "customer id {} out of range",
                    entry
                )));
            }
            current.customers.push(entry as usize);
        }

        if !current.customers.is_empty() {
            return Err(VrptwError::InvalidSolution(
                "last tour is not terminated".to_string(),
            ));
        }
        if tours.len() != vehicle_count {
            return Err(VrptwError::InvalidSolution(format!(
                "expected {} tours, found {}",
                vehicle_count,
                tours.len()
            )));
        }

        Ok(TourMatrix { tours })
    }

    /// Encode as a flat sentinel-terminated array.
    pub fn to_flat(&self) -> Vec<isize> {
        let mut flat = Vec::with_capacity(self.customer_count() + self.tours.len());
        for tour in &self.tours {
            flat.extend(tour.customers.iter().map(|&c| c as isize));
            flat.push(TOUR_END);
        }
        flat
    }

    pub fn vehicle_count(&self) -> usize {
        self.tours.len()
    }

    /// Total number of customer visits over all tours.
    pub fn customer_count(&self) -> usize {
        self.tours.iter().map(Tour::len).sum()
    }

    /// Retag vehicle `i` with the duplicated depot `customer_count + i`.
    pub fn renumber_depots(&mut self, customer_count: usize) {
        for (i, tour) in self.tours.iter_mut().enumerate() {
            tour.depot = customer_count + i;
        }
    }
}

/// A complete solution in flat encoding, with its vehicle count and distance.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Number of vehicles (sentinel-terminated sequences)
    pub vehicle_count: usize,
    /// Total travelled distance
    pub distance: f64,
    /// Flat tour encoding
    pub tours: Vec<isize>,
}

impl Solution {
    pub fn new(vehicle_count: usize, distance: f64, tours: Vec<isize>) -> Self {
        Solution {
            vehicle_count,
            distance,
            tours,
        }
    }

    /// Flatten a tour matrix whose distance is already known.
    pub fn from_tour_matrix(matrix: &TourMatrix, distance: f64) -> Self {
        Solution {
            vehicle_count: matrix.vehicle_count(),
            distance,
            tours: matrix.to_flat(),
        }
    }

    /// Decode into a tour matrix.
    pub fn to_tour_matrix(&self, customer_count: usize) -> Result<TourMatrix, VrptwError> {
        TourMatrix::from_flat(self.vehicle_count, &self.tours, customer_count)
    }

    /// The raw per-vehicle slices of the flat encoding, sentinels stripped.
    pub fn routes(&self) -> impl Iterator<Item = &[isize]> + '_ {
        self.tours
            .split(|&entry| entry == TOUR_END)
            .take(self.tours.iter().filter(|&&e| e == TOUR_END).count())
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Vehicles: {}", self.vehicle_count)?;
        writeln!(f, "  Distance: {:.2}", self.distance)?;

        for (i, route) in self.routes().enumerate() {
            writeln!(f, "  Route {}: [{}]", i, route.iter().join(", "))?;
        }

        Ok(())
    }
}
