//! Utility functions and structures for reporting MACS-VRPTW results.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use itertools::Itertools;

use crate::problem::Problem;
use crate::solution::Solution;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Save a human-readable route report to a file.
pub fn save_solution<P: AsRef<Path>>(
    solution: &Solution,
    problem: &Problem,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    write_solution(&mut file, solution, problem)
}

/// Write a route report with arrival times for every customer.
pub fn write_solution<W: Write>(
    writer: &mut W,
    solution: &Solution,
    problem: &Problem,
) -> std::io::Result<()> {
    writeln!(writer, "VRPTW Solution for instance: {}", problem.name)?;
    writeln!(writer, "Number of Vehicles: {}", solution.vehicle_count)?;
    writeln!(writer, "Total Distance: {:.2}", solution.distance)?;
    writeln!(writer, "Is Feasible: {}", problem.is_feasible(solution))?;
    writeln!(writer)?;

    for (i, route) in solution.routes().enumerate() {
        let customers: Vec<usize> = route.iter().map(|&c| c as usize).collect();
        writeln!(
            writer,
            "Route #{}: D -> {} -> D",
            i + 1,
            customers.iter().map(|c| c + 1).join(" -> ")
        )?;

        let mut time = 0.0;
        let mut last = problem.depot_index();
        let mut load = 0;
        for &customer in &customers {
            let c = &problem.customers[customer];
            time = (time + problem.distance(last, customer)).max(c.ready_time);
            writeln!(
                writer,
                "  {:>4}  start {:>8.2}  window [{:.0}, {:.0}]",
                customer + 1,
                time,
                c.ready_time,
                c.due_date
            )?;
            time += c.service_time;
            load += c.demand;
            last = customer;
        }

        writeln!(
            writer,
            "  Distance: {:.2}",
            problem.route_distance(&customers)
        )?;
        writeln!(writer, "  Load: {} / {}", load, problem.capacity)?;
        writeln!(writer)?;
    }

    Ok(())
}

/// Summary of a finished run.
pub struct RunStatistics {
    pub runtime: Duration,
    pub restarts: u32,
    pub seed_vehicle_count: usize,
    pub seed_distance: f64,
    pub vehicle_count: usize,
    pub distance: f64,
    pub is_feasible: bool,
}

impl RunStatistics {
    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Runtime: {}
- Colony Restarts: {}
- Seed Solution: {} vehicles, distance {:.2}
- Best Solution: {} vehicles, distance {:.2}
- Best Solution Feasible: {}",
            format_duration(self.runtime),
            self.restarts,
            self.seed_vehicle_count,
            self.seed_distance,
            self.vehicle_count,
            self.distance,
            self.is_feasible
        )
    }
}

/// Render the solution as an ASCII plot, one symbol per route.
pub fn render_solution(solution: &Solution, problem: &Problem) -> String {
    let mut min_x = problem.depot.x;
    let mut min_y = problem.depot.y;
    let mut max_x = problem.depot.x;
    let mut max_y = problem.depot.y;

    for c in &problem.customers {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }

    let width = 80;
    let height = 25;
    let span_x = (max_x - min_x).max(1.0);
    let span_y = (max_y - min_y).max(1.0);
    let cell = |x: f64, y: f64| {
        let col = ((x - min_x) / span_x * (width as f64 - 1.0)) as usize;
        // row 0 at the top
        let row = height - 1 - ((y - min_y) / span_y * (height as f64 - 1.0)) as usize;
        (row, col)
    };

    let mut grid = vec![vec![' '; width]; height];
    let route_symbols = ['*', '+', 'x', '#', '@', '&', '%', '=', '^', '$'];

    for (r_idx, route) in solution.routes().enumerate() {
        let symbol = route_symbols[r_idx % route_symbols.len()];
        for &customer in route {
            if let Some(c) = problem.customers.get(customer as usize) {
                let (row, col) = cell(c.x, c.y);
                grid[row][col] = symbol;
            }
        }
    }

    let (row, col) = cell(problem.depot.x, problem.depot.y);
    grid[row][col] = 'D';

    let mut out = String::new();
    for row in &grid {
        out.extend(row.iter());
        out.push('\n');
    }
    out.push('\n');
    out.push_str("Legend:\nD - Depot\n");
    for r_idx in 0..solution.vehicle_count.min(route_symbols.len()) {
        out.push_str(&format!("{} - Route #{}\n", route_symbols[r_idx], r_idx + 1));
    }
    out
}

/// Print solution visualization to console.
pub fn print_solution_visualization(solution: &Solution, problem: &Problem) {
    println!("Solution Visualization for {}", problem.name);
    println!("Vehicles: {}", solution.vehicle_count);
    println!("Total Distance: {:.2}", solution.distance);
    println!();
    println!("{}", render_solution(solution, problem));
}
