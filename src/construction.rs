//! Nearest-neighbour construction heuristics for an initial feasible solution.
//!
//! All variants share the same greedy loop: extend the current vehicle with
//! the cheapest feasible unserved customer, open a new vehicle when nothing
//! fits, stop once every customer is served. They differ only in the cost
//! assigned to a candidate.

use serde::{Deserialize, Serialize};

use crate::error::VrptwError;
use crate::problem::Problem;
use crate::solution::{Solution, TOUR_END};

/// Available construction heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConstructionHeuristic {
    /// Solomon (1987): weighted distance, waiting time and urgency
    Solomon1987 { w1: f64, w2: f64, w3: f64 },
    /// Gambardella et al. (1999): waiting-or-travel time times urgency
    Gambardella1999,
    /// Ellabib et al. (2002): Gambardella criterion plus polar angle difference
    Ellabib2002 { w1: f64, w2: f64 },
}

impl ConstructionHeuristic {
    /// Solomon heuristic with the customary weights.
    pub fn solomon() -> Self {
        ConstructionHeuristic::Solomon1987 {
            w1: 0.4,
            w2: 0.4,
            w3: 0.2,
        }
    }

    /// Ellabib heuristic with equal weights.
    pub fn ellabib() -> Self {
        ConstructionHeuristic::Ellabib2002 { w1: 0.5, w2: 0.5 }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConstructionHeuristic::Solomon1987 { .. } => "nn_solomon1987",
            ConstructionHeuristic::Gambardella1999 => "nn_gambardella1999",
            ConstructionHeuristic::Ellabib2002 { .. } => "nn_ellabib2002",
        }
    }

    /// Build a solution and store it in the problem.
    pub fn construct(&self, problem: &mut Problem) -> Result<(), VrptwError> {
        let solution = self.build(problem)?;
        problem.set_solution(solution);
        Ok(())
    }

    /// Build a solution without touching the problem.
    pub fn build(&self, problem: &Problem) -> Result<Solution, VrptwError> {
        let heuristic = self.normalized()?;
        nearest_neighbor(problem, &heuristic)
    }

    /// Validate the weights and scale them to sum to one.
    fn normalized(&self) -> Result<Self, VrptwError> {
        match *self {
            ConstructionHeuristic::Solomon1987 { w1, w2, w3 } => {
                let [w1, w2, w3] = normalize_weights([w1, w2, w3])?;
                Ok(ConstructionHeuristic::Solomon1987 { w1, w2, w3 })
            }
            ConstructionHeuristic::Gambardella1999 => Ok(*self),
            ConstructionHeuristic::Ellabib2002 { w1, w2 } => {
                let [w1, w2] = normalize_weights([w1, w2])?;
                Ok(ConstructionHeuristic::Ellabib2002 { w1, w2 })
            }
        }
    }

    /// Cost of moving from `last` (at `time`) to `customer`.
    fn cost(&self, problem: &Problem, last: usize, time: f64, customer: usize) -> f64 {
        let c = &problem.customers[customer];
        let distance = problem.distance(last, customer);

        match *self {
            ConstructionHeuristic::Solomon1987 { w1, w2, w3 } => {
                let waiting = (c.ready_time - time).max(0.0);
                let urgency = c.due_date - time - distance;
                w1 * distance + w2 * waiting + w3 * urgency
            }
            ConstructionHeuristic::Gambardella1999 => {
                gambardella_cost(c.ready_time, c.due_date, time, distance)
            }
            ConstructionHeuristic::Ellabib2002 { w1, w2 } => {
                let (lx, ly) = if last == problem.depot_index() {
                    (problem.depot.x, problem.depot.y)
                } else {
                    let l = &problem.customers[last];
                    (l.x, l.y)
                };
                let angle = (ly.atan2(lx) - c.y.atan2(c.x)).abs();
                w1 * gambardella_cost(c.ready_time, c.due_date, time, distance) + w2 * angle
            }
        }
    }
}

fn gambardella_cost(ready_time: f64, due_date: f64, time: f64, distance: f64) -> f64 {
    (ready_time - time).max(distance) * (due_date - time)
}

fn normalize_weights<const N: usize>(weights: [f64; N]) -> Result<[f64; N], VrptwError> {
    if weights.iter().any(|&w| w < 0.0 || !w.is_finite()) {
        return Err(VrptwError::Configuration(format!(
            "heuristic weights must be non-negative, got {:?}",
            weights
        )));
    }
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(VrptwError::Configuration(
            "heuristic weights must not all be zero".to_string(),
        ));
    }
    Ok(weights.map(|w| w / sum))
}

fn nearest_neighbor(
    problem: &Problem,
    heuristic: &ConstructionHeuristic,
) -> Result<Solution, VrptwError> {
    let n = problem.customer_count();
    let depot = problem.depot_index();
    let mut visited = vec![false; n];
    let mut remaining = n;
    let mut tours: Vec<isize> = Vec::with_capacity(2 * n);
    let mut vehicle_count = 0;
    let mut total_distance = 0.0;

    while remaining > 0 {
        vehicle_count += 1;
        let mut time = 0.0;
        let mut capacity = problem.capacity;
        let mut last = depot;
        let mut served = 0;

        loop {
            let next = (0..n)
                .filter(|&i| !visited[i])
                .filter(|&i| can_extend(problem, last, time, capacity, i))
                .map(|i| (i, heuristic.cost(problem, last, time, i)))
                .min_by(|a, b| a.1.total_cmp(&b.1));

            let Some((customer, _)) = next else {
                break;
            };

            let c = &problem.customers[customer];
            let distance = problem.distance(last, customer);
            total_distance += distance;
            time = (time + distance).max(c.ready_time) + c.service_time;
            capacity -= c.demand;
            visited[customer] = true;
            remaining -= 1;
            served += 1;
            tours.push(customer as isize);
            last = customer;

            if capacity == 0 {
                break;
            }
        }

        if served == 0 {
            let unserved = (0..n).filter(|&i| !visited[i]).collect();
            return Err(VrptwError::UnservableCustomers(unserved));
        }

        total_distance += problem.distance(last, depot);
        tours.push(TOUR_END);
    }

    Ok(Solution::new(vehicle_count, total_distance, tours))
}

/// Capacity, due date and return-to-depot checks for appending a customer.
fn can_extend(problem: &Problem, last: usize, time: f64, capacity: u32, customer: usize) -> bool {
    let c = &problem.customers[customer];
    if c.demand > capacity {
        return false;
    }
    let arrival = time + problem.distance(last, customer);
    if arrival > c.due_date {
        return false;
    }
    let finish = arrival.max(c.ready_time) + c.service_time;
    finish + problem.depot_distance(customer) <= problem.depot.due_date
}
