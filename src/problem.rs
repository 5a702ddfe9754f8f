//! Problem definition and data structures for the VRPTW.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::VrptwError;
use crate::solution::{Solution, TourMatrix, TOUR_END};

/// A customer with its demand, time window and service duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub demand: u32,
    pub ready_time: f64,
    pub due_date: f64,
    pub service_time: f64,
}

impl Customer {
    /// Create a new customer.
    pub fn new(
        id: usize,
        x: f64,
        y: f64,
        demand: u32,
        ready_time: f64,
        due_date: f64,
        service_time: f64,
    ) -> Self {
        Customer {
            id,
            x,
            y,
            demand,
            ready_time,
            due_date,
            service_time,
        }
    }
}

/// The single depot every vehicle leaves from and returns to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub x: f64,
    pub y: f64,
    /// Latest time a vehicle may be back
    pub due_date: f64,
}

impl Depot {
    pub fn new(x: f64, y: f64, due_date: f64) -> Self {
        Depot { x, y, due_date }
    }
}

/// Symmetric Euclidean distances over customers and the depot.
///
/// Stored as a flat `(N + 1)²` arena, with the depot at index `N`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute all pairwise distances between the given points.
    pub fn compute(points: &[(f64, f64)]) -> Result<Self, VrptwError> {
        let size = points.len();
        let cells = size.checked_mul(size).ok_or(VrptwError::Allocation {
            what: "distance matrix",
        })?;

        let mut values = Vec::new();
        values
            .try_reserve_exact(cells)
            .map_err(|_| VrptwError::Allocation {
                what: "distance matrix",
            })?;
        values.resize(cells, 0.0);

        for i in 0..size {
            for j in (i + 1)..size {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                let d = (dx * dx + dy * dy).sqrt();
                values[i * size + j] = d;
                values[j * size + i] = d;
            }
        }

        Ok(DistanceMatrix { size, values })
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[from * self.size + to]
    }

    /// Number of rows (customers plus depot).
    pub fn size(&self) -> usize {
        self.size
    }
}

/// A published reference result for an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownSolution {
    pub vehicle_count: usize,
    pub distance: f64,
    pub authors: String,
}

/// Represents a VRPTW problem instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    /// Vehicles available according to the instance
    pub vehicle_count: usize,
    pub capacity: u32,
    pub depot: Depot,
    pub customers: Vec<Customer>,
    distances: DistanceMatrix,
    /// Current solution, written by the heuristics and the solver
    pub solution: Option<Solution>,
    pub optimal: Option<KnownSolution>,
    pub best_heuristic: Option<KnownSolution>,
}

impl Problem {
    /// Create a new VRPTW problem; customer ids must equal their positions.
    pub fn new(
        name: String,
        vehicle_count: usize,
        capacity: u32,
        depot: Depot,
        customers: Vec<Customer>,
    ) -> Result<Self, VrptwError> {
        if let Some((index, customer)) = customers
            .iter()
            .enumerate()
            .find(|(index, customer)| customer.id != *index)
        {
            return Err(VrptwError::Configuration(format!(
                "customer at position {} has id {}",
                index, customer.id
            )));
        }

        let mut points: Vec<(f64, f64)> = customers.iter().map(|c| (c.x, c.y)).collect();
        points.push((depot.x, depot.y));
        let distances = DistanceMatrix::compute(&points)?;

        Ok(Problem {
            name,
            vehicle_count,
            capacity,
            depot,
            customers,
            distances,
            solution: None,
            optimal: None,
            best_heuristic: None,
        })
    }

    /// Attach published reference results.
    pub fn with_known_solutions(
        mut self,
        optimal: Option<KnownSolution>,
        best_heuristic: Option<KnownSolution>,
    ) -> Self {
        self.optimal = optimal;
        self.best_heuristic = best_heuristic;
        self
    }

    /// Get the number of customers (excluding the depot).
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Index of the depot row in the distance matrix.
    pub fn depot_index(&self) -> usize {
        self.customers.len()
    }

    /// Distance between two nodes. Every id at or beyond the depot index is
    /// treated as the depot, so duplicated depot nodes can be passed directly.
    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        let depot = self.depot_index();
        self.distances.get(from.min(depot), to.min(depot))
    }

    /// Distance between a customer and the depot.
    #[inline]
    pub fn depot_distance(&self, customer: usize) -> f64 {
        self.distances.get(customer, self.depot_index())
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Replace the stored solution.
    pub fn set_solution(&mut self, solution: Solution) {
        self.solution = Some(solution);
    }

    /// Length of depot -> route -> depot, without any feasibility check.
    pub fn route_distance(&self, route: &[usize]) -> f64 {
        let depot = self.depot_index();
        let mut last = depot;
        let mut distance = 0.0;
        for &customer in route {
            distance += self.distance(last, customer);
            last = customer;
        }
        distance + self.distance(last, depot)
    }

    /// Simulate a single route leaving the depot at time zero.
    ///
    /// Returns the route distance if capacity, every customer's due date and
    /// the depot due date are respected.
    pub fn check_route(&self, route: &[usize]) -> Option<f64> {
        let mut load = 0u32;
        let mut time = 0.0;
        let mut distance = 0.0;
        let mut last = self.depot_index();

        for &customer in route {
            let c = self.customers.get(customer)?;
            load = load.checked_add(c.demand)?;
            if load > self.capacity {
                return None;
            }

            let d = self.distances.get(last, customer);
            distance += d;
            time += d;
            if time > c.due_date {
                return None;
            }
            if time < c.ready_time {
                time = c.ready_time;
            }
            time += c.service_time;
            last = customer;
        }

        let back = self.distances.get(last, self.depot_index());
        if time + back > self.depot.due_date {
            return None;
        }

        Some(distance + back)
    }

    /// Total distance of a tour matrix serving every customer exactly once
    /// with feasible routes, or `None`.
    pub fn evaluate_tours(&self, matrix: &TourMatrix) -> Option<f64> {
        let mut visited = vec![false; self.customer_count()];
        let mut total = 0.0;

        for tour in &matrix.tours {
            for &customer in &tour.customers {
                match visited.get_mut(customer) {
                    Some(seen) if !*seen => *seen = true,
                    _ => return None,
                }
            }
            total += self.check_route(&tour.customers)?;
        }

        if visited.iter().all(|&v| v) {
            Some(total)
        } else {
            None
        }
    }

    /// Canonical acceptance check for a flat solution.
    pub fn is_feasible(&self, solution: &Solution) -> bool {
        let terminated = solution.tours.iter().filter(|&&e| e == TOUR_END).count();
        if terminated != solution.vehicle_count {
            return false;
        }
        match solution.to_tour_matrix(self.customer_count()) {
            Ok(matrix) => self.evaluate_tours(&matrix).is_some(),
            Err(_) => false,
        }
    }

    /// Whether the stored solution passes the feasibility check.
    pub fn is_solution_feasible(&self) -> bool {
        self.solution
            .as_ref()
            .map_or(false, |solution| self.is_feasible(solution))
    }

    /// Load a problem from a file in Solomon format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VrptwError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse an instance in Solomon format.
    pub fn parse(content: &str) -> Result<Self, VrptwError> {
        let mut reader = LineReader::new(content);

        let (_, name) = reader.next_line("problem name")?;
        let name = name.to_string();

        reader.expect_header(&["VEHICLE"])?;
        reader.expect_header(&["NUMBER", "CAPACITY"])?;
        let (line, values) = reader.next_line("vehicle number and capacity")?;
        let fields = parse_numbers(line, values, 2)?;
        let vehicle_count = narrow(line, fields[0], "vehicle number")?;
        let capacity = narrow(line, fields[1], "capacity")?;

        reader.expect_header(&["CUSTOMER"])?;
        reader.expect_header(&[
            "CUST", "NO.", "XCOORD.", "YCOORD.", "DEMAND", "READY", "TIME", "DUE", "DATE",
            "SERVICE", "TIME",
        ])?;

        let (line, values) = reader.next_line("depot record")?;
        let fields = parse_numbers(line, values, 7)?;
        if as_integer(line, fields[0], "depot number")? != 0 {
            return Err(VrptwError::Parse {
                line,
                message: "depot record must be numbered 0".to_string(),
            });
        }
        let depot = Depot::new(fields[1], fields[2], fields[5]);

        let mut customers = Vec::new();
        while let Some((line, values)) = reader.try_next_line() {
            let fields = parse_numbers(line, values, 7)?;
            let number = as_integer(line, fields[0], "customer number")?;
            if number != customers.len() as i64 + 1 {
                return Err(VrptwError::Parse {
                    line,
                    message: format!(
                        "expected customer number {}, found {}",
                        customers.len() + 1,
                        number
                    ),
                });
            }
            let demand = narrow(line, fields[3], "demand")?;
            customers.push(Customer::new(
                customers.len(),
                fields[1],
                fields[2],
                demand,
                fields[4],
                fields[5],
                fields[6],
            ));
        }

        if customers.is_empty() {
            return Err(VrptwError::Parse {
                line: reader.line,
                message: "no customer records".to_string(),
            });
        }

        Problem::new(name, vehicle_count, capacity, depot, customers)
    }
}

/// Iterates over non-blank lines, tracking 1-based line numbers.
struct LineReader<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
}

impl<'a> LineReader<'a> {
    fn new(content: &'a str) -> Self {
        LineReader {
            lines: content.lines(),
            line: 0,
        }
    }

    fn try_next_line(&mut self) -> Option<(usize, &'a str)> {
        for text in self.lines.by_ref() {
            self.line += 1;
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some((self.line, trimmed));
            }
        }
        None
    }

    fn next_line(&mut self, expected: &str) -> Result<(usize, &'a str), VrptwError> {
        let line = self.line + 1;
        self.try_next_line().ok_or_else(|| VrptwError::Parse {
            line,
            message: format!("{} expected", expected),
        })
    }

    fn expect_header(&mut self, words: &[&str]) -> Result<(), VrptwError> {
        let expected = words.join(" ");
        let (line, text) = self.next_line(&format!("header '{}'", expected))?;
        let found: Vec<&str> = text.split_whitespace().collect();
        let matches = found.len() >= words.len()
            && words
                .iter()
                .zip(&found)
                .all(|(word, token)| word.eq_ignore_ascii_case(token));
        if matches {
            Ok(())
        } else {
            Err(VrptwError::Parse {
                line,
                message: format!("header '{}' expected", expected),
            })
        }
    }
}

fn parse_numbers(line: usize, text: &str, count: usize) -> Result<Vec<f64>, VrptwError> {
    let fields = text
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| VrptwError::Parse {
                line,
                message: format!("invalid number '{}'", token),
            })
        })
        .collect::<Result<Vec<f64>, VrptwError>>()?;

    if fields.len() < count {
        return Err(VrptwError::Parse {
            line,
            message: format!("expected {} values, found {}", count, fields.len()),
        });
    }
    Ok(fields)
}

fn as_integer(line: usize, value: f64, what: &str) -> Result<i64, VrptwError> {
    if value.fract() != 0.0 || value < 0.0 || value >= i64::MAX as f64 {
        return Err(VrptwError::Parse {
            line,
            message: format!("{} must be a non-negative integer, found {}", what, value),
        });
    }
    Ok(value as i64)
}

/// Integer field converted to the target type, rejecting values out of its range.
fn narrow<T: TryFrom<i64>>(line: usize, value: f64, what: &str) -> Result<T, VrptwError> {
    let integer = as_integer(line, value, what)?;
    T::try_from(integer).map_err(|_| VrptwError::Parse {
        line,
        message: format!("{} {} is out of range", what, integer),
    })
}
