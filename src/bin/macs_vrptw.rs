//! Command line front-end for the MACS-VRPTW solver.

use clap::{Parser, ValueEnum};
use log::error;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use macs_vrptw::config::Config;
use macs_vrptw::construction::ConstructionHeuristic;
use macs_vrptw::error::VrptwError;
use macs_vrptw::logger::SolutionLogger;
use macs_vrptw::problem::Problem;
use macs_vrptw::utils::{print_solution_visualization, save_solution, RunStatistics};
use macs_vrptw::MacsVrptw;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Heuristic {
    Gambardella,
    Solomon,
    Ellabib,
}

impl From<Heuristic> for ConstructionHeuristic {
    fn from(heuristic: Heuristic) -> Self {
        match heuristic {
            Heuristic::Gambardella => ConstructionHeuristic::Gambardella1999,
            Heuristic::Solomon => ConstructionHeuristic::solomon(),
            Heuristic::Ellabib => ConstructionHeuristic::ellabib(),
        }
    }
}

/// Solve a VRPTW instance in Solomon format with MACS-VRPTW.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Instance file
    instance: PathBuf,
    /// Time budget in seconds
    #[arg(short, long, default_value_t = 300)]
    seconds: u64,
    /// Ants per colony batch
    #[arg(long, default_value_t = 10)]
    ants: usize,
    /// Heuristic exponent
    #[arg(long, default_value_t = 1)]
    beta: i32,
    /// Exploitation probability
    #[arg(long, default_value_t = 0.9)]
    q0: f64,
    /// Global evaporation rate
    #[arg(long, default_value_t = 0.1)]
    rho: f64,
    /// Local evaporation rate
    #[arg(long, default_value_t = 0.1)]
    xi: f64,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Heuristic for the initial solution
    #[arg(long, value_enum, default_value_t = Heuristic::Gambardella)]
    heuristic: Heuristic,
    /// Write the run log to this file
    #[arg(long)]
    log: Option<PathBuf>,
    /// Write a route report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
    /// Print an ASCII plot of the routes
    #[arg(long)]
    plot: bool,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    instance: &'a str,
    vehicle_count: usize,
    distance: f64,
    feasible: bool,
    runtime_ms: u128,
    tours: &'a [isize],
}

fn run(args: Args) -> Result<(), VrptwError> {
    let problem = Problem::from_file(&args.instance)?;
    log::info!(
        "Loaded problem {} with {} customers, capacity {}",
        problem.name,
        problem.customer_count(),
        problem.capacity
    );

    let mut config = Config::new()
        .with_ants_count(args.ants)
        .with_beta(args.beta)
        .with_q0(args.q0)
        .with_rho(args.rho)
        .with_xi(args.xi)
        .with_time_limit(Duration::from_secs(args.seconds))
        .with_initial_heuristic(args.heuristic.into());
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut algorithm = MacsVrptw::new(problem, config).with_logger(SolutionLogger::new());

    let solution = algorithm.run()?.clone();
    let problem = &algorithm.problem;
    let feasible = problem.is_feasible(&solution);

    if let (Some(path), Some(logger)) = (&args.log, &algorithm.logger) {
        logger.write(path)?;
    }
    if let Some(path) = &args.output {
        save_solution(&solution, problem, path)?;
    }

    if args.json {
        let result = JsonResult {
            instance: &problem.name,
            vehicle_count: solution.vehicle_count,
            distance: solution.distance,
            feasible,
            runtime_ms: algorithm.run_time.as_millis(),
            tours: &solution.tours,
        };
        let json = serde_json::to_string_pretty(&result)
            .map_err(|err| VrptwError::Io(err.into()))?;
        println!("{}", json);
    } else {
        let seed = algorithm
            .logger
            .as_ref()
            .and_then(|logger| logger.entries().first().cloned());
        let stats = RunStatistics {
            runtime: algorithm.run_time,
            restarts: algorithm.restarts,
            seed_vehicle_count: seed.as_ref().map_or(0, |entry| entry.vehicle_count),
            seed_distance: seed.as_ref().map_or(0.0, |entry| entry.distance),
            vehicle_count: solution.vehicle_count,
            distance: solution.distance,
            is_feasible: feasible,
        };
        println!("{}", stats.format());
        println!("{:?}", solution);
    }

    if args.plot {
        print_solution_visualization(&solution, problem);
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::from(err.code() as u8)
        }
    }
}
