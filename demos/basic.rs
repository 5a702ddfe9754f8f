//! Basic example of using the MACS-VRPTW library.

use macs_vrptw::config::Config;
use macs_vrptw::logger::SolutionLogger;
use macs_vrptw::problem::Problem;
use macs_vrptw::utils::{format_duration, print_solution_visualization, save_solution};
use macs_vrptw::MacsVrptw;
use std::env;
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get instance path from command line or use default
    let args: Vec<String> = env::args().collect();
    let instance_path = if args.len() > 1 {
        args[1].as_str()
    } else {
        "instances/c101.txt"
    };

    println!("Loading problem from: {}", instance_path);
    let problem = Problem::from_file(instance_path)?;
    println!(
        "Loaded problem: {} with {} customers",
        problem.name,
        problem.customer_count()
    );

    let config = Config::new()
        .with_ants_count(10)
        .with_beta(1)
        .with_q0(0.9)
        .with_rho(0.1)
        .with_xi(0.1)
        .with_time_limit(Duration::from_secs(60));

    let mut algorithm = MacsVrptw::new(problem.clone(), config).with_logger(SolutionLogger::new());

    println!("Starting search (time limit: 60s)");
    let start_time = Instant::now();
    let best_solution = algorithm.run()?.clone();
    let runtime = start_time.elapsed();

    println!("Search completed in {}", format_duration(runtime));
    println!("Vehicles: {}", best_solution.vehicle_count);
    println!("Distance: {:.2}", best_solution.distance);
    println!("Is feasible: {}", problem.is_feasible(&best_solution));

    if let Some(logger) = &algorithm.logger {
        let log_path = format!("{}.log", problem.name);
        println!("Writing run log to: {}", log_path);
        logger.write(&log_path)?;
    }

    let output_path = format!("{}.sol", problem.name);
    println!("Saving solution to: {}", output_path);
    save_solution(&best_solution, &problem, &output_path)?;

    print_solution_visualization(&best_solution, &problem);

    Ok(())
}
