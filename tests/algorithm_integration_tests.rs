//! End-to-end tests of the MACS-VRPTW search.

use std::time::Duration;

use macs_vrptw::config::Config;
use macs_vrptw::construction::ConstructionHeuristic;
use macs_vrptw::error::VrptwError;
use macs_vrptw::logger::{ParameterValue, SolutionLogger};
use macs_vrptw::problem::{Customer, Depot, Problem};
use macs_vrptw::{MacsVrptw, ALGORITHM_NAME};

fn create_test_problem() -> Problem {
    let customers = vec![
        Customer::new(0, 10.0, 0.0, 5, 0.0, 1000.0, 0.0),
        Customer::new(1, 20.0, 0.0, 5, 0.0, 1000.0, 0.0),
    ];
    Problem::new(
        "LineProblem".to_string(),
        2,
        10,
        Depot::new(0.0, 0.0, 1000.0),
        customers,
    )
    .unwrap()
}

/// Twenty-five customers in clusters around the depot with staggered windows.
fn create_clustered_problem() -> Problem {
    let centers = [(20.0, 20.0), (80.0, 20.0), (50.0, 80.0)];
    let customers = (0..25)
        .map(|i| {
            let (cx, cy) = centers[i % centers.len()];
            let offset = (i / centers.len()) as f64;
            let x = cx + (offset * 1.7).sin() * 8.0;
            let y = cy + (offset * 1.3).cos() * 8.0;
            let ready = (i % 4) as f64 * 60.0;
            Customer::new(i, x, y, (i % 5) as u32 + 3, ready, ready + 300.0, 10.0)
        })
        .collect();
    Problem::new(
        "Clustered".to_string(),
        25,
        40,
        Depot::new(50.0, 50.0, 1000.0),
        customers,
    )
    .unwrap()
}

/// Greedy construction needs three vehicles here, while {A, D} and {B, C}
/// fill two vehicles exactly.
fn create_overloaded_seed_problem() -> Problem {
    let customers = vec![
        Customer::new(0, 10.0, 0.0, 5, 0.0, 1000.0, 0.0),
        Customer::new(1, 0.0, 10.0, 6, 0.0, 1000.0, 0.0),
        Customer::new(2, 20.0, 0.0, 4, 0.0, 1000.0, 0.0),
        Customer::new(3, 30.0, 0.0, 5, 0.0, 1000.0, 0.0),
    ];
    Problem::new(
        "OverloadedSeed".to_string(),
        4,
        10,
        Depot::new(0.0, 0.0, 1000.0),
        customers,
    )
    .unwrap()
}

fn short_config() -> Config {
    Config::new()
        .with_seed(42)
        .with_time_limit(Duration::from_millis(300))
}

#[test]
fn test_search_returns_feasible_solution() {
    let problem = create_clustered_problem();
    let seed = ConstructionHeuristic::Gambardella1999
        .build(&problem)
        .unwrap();

    let mut algorithm = MacsVrptw::new(problem, short_config());
    let solution = algorithm.run().unwrap().clone();

    assert!(algorithm.problem.is_feasible(&solution));
    assert!(algorithm.problem.is_solution_feasible());
    assert!(solution.vehicle_count <= seed.vehicle_count);
    if solution.vehicle_count == seed.vehicle_count {
        assert!(solution.distance <= seed.distance + 1e-9);
    }
    assert!(algorithm.run_time >= Duration::from_millis(300));
}

#[test]
fn test_logged_solutions_strictly_improve() {
    let problem = create_clustered_problem();
    let seed = ConstructionHeuristic::Gambardella1999
        .build(&problem)
        .unwrap();

    let mut algorithm =
        MacsVrptw::new(problem, short_config()).with_logger(SolutionLogger::new());
    let solution = algorithm.run().unwrap().clone();

    let logger = algorithm.logger.as_ref().unwrap();
    assert_eq!(logger.algorithm(), ALGORITHM_NAME);

    let entries = logger.entries();
    assert!(!entries.is_empty());
    assert_eq!(entries[0].vehicle_count, seed.vehicle_count);
    assert_eq!(entries[0].tours, seed.tours);

    for pair in entries.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        assert!(after.elapsed_ms >= before.elapsed_ms);
        assert!(
            after.vehicle_count < before.vehicle_count
                || (after.vehicle_count == before.vehicle_count
                    && after.distance < before.distance)
        );
    }

    let last = entries.last().unwrap();
    assert_eq!(last.vehicle_count, solution.vehicle_count);
    assert_eq!(last.distance, solution.distance);
    assert_eq!(last.tours, solution.tours);
}

#[test]
fn test_line_problem_keeps_single_vehicle() {
    let mut algorithm = MacsVrptw::new(create_test_problem(), short_config());
    let solution = algorithm.run().unwrap();

    assert_eq!(solution.vehicle_count, 1);
    assert!((solution.distance - 40.0).abs() < 1e-9);
    assert_eq!(algorithm.restarts, 0);
}

#[test]
fn test_exclusive_windows_need_two_vehicles() {
    let customers = vec![
        Customer::new(0, 10.0, 0.0, 1, 0.0, 15.0, 0.0),
        Customer::new(1, 0.0, 10.0, 1, 0.0, 15.0, 0.0),
    ];
    let problem = Problem::new(
        "ExclusiveWindows".to_string(),
        2,
        10,
        Depot::new(0.0, 0.0, 100.0),
        customers,
    )
    .unwrap();

    let mut algorithm = MacsVrptw::new(problem, short_config());
    let solution = algorithm.run().unwrap().clone();

    assert_eq!(solution.vehicle_count, 2);
    assert!((solution.distance - 40.0).abs() < 1e-9);
    assert!(algorithm.problem.is_feasible(&solution));
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let invalid = [
        short_config().with_ants_count(0),
        short_config().with_beta(-1),
        short_config().with_q0(1.5),
        short_config().with_rho(-0.1),
        short_config().with_xi(2.0),
        short_config().with_time_limit(Duration::ZERO),
    ];

    for config in invalid {
        let mut algorithm = MacsVrptw::new(create_test_problem(), config);
        assert!(matches!(
            algorithm.run(),
            Err(VrptwError::Configuration(_))
        ));
    }
}

#[test]
fn test_unservable_customer_aborts_run() {
    let customers = vec![
        Customer::new(0, 10.0, 0.0, 50, 0.0, 1000.0, 0.0),
        Customer::new(1, 20.0, 0.0, 5, 0.0, 1000.0, 0.0),
    ];
    let problem = Problem::new(
        "TooHeavy".to_string(),
        2,
        10,
        Depot::new(0.0, 0.0, 1000.0),
        customers,
    )
    .unwrap();

    let mut algorithm = MacsVrptw::new(problem, short_config());
    assert!(matches!(
        algorithm.run(),
        Err(VrptwError::UnservableCustomers(_))
    ));
}

#[test]
fn test_alternative_heuristic_seeds_the_search() {
    let config = short_config().with_initial_heuristic(ConstructionHeuristic::solomon());
    let mut algorithm =
        MacsVrptw::new(create_clustered_problem(), config).with_logger(SolutionLogger::new());
    let solution = algorithm.run().unwrap().clone();

    assert!(algorithm.problem.is_feasible(&solution));
}

#[test]
fn test_run_log_layout() {
    let mut algorithm =
        MacsVrptw::new(create_test_problem(), short_config()).with_logger(SolutionLogger::new());
    algorithm.run().unwrap();

    let logger = algorithm.logger.as_ref().unwrap();
    assert_eq!(
        logger.parameters()[1],
        ("ants_count".to_string(), ParameterValue::Integer(10))
    );

    let mut buffer = Vec::new();
    logger.write_to(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "# MACS-VRPTW");
    assert_eq!(lines[1], "# parameters");
    assert_eq!(lines[2], "calc_seconds = 0");
    assert_eq!(lines[3], "ants_count = 10");
    assert_eq!(lines[4], "beta = 1");
    assert_eq!(lines[5], "q0 = 0.900000");
    assert_eq!(lines[6], "rho = 0.100000");
    assert_eq!(lines[7], "xi = 0.100000");
    assert_eq!(lines[8], "# solutions");

    // only the seed: nothing beats one vehicle at distance 40
    let fields: Vec<&str> = lines[9].split(';').collect();
    assert!(fields[0].parse::<u128>().is_ok());
    assert_eq!(&fields[1..], &["1", "40.000000", "0", "1", "-1", ""]);
    assert_eq!(lines[10], "# EOF");
    assert_eq!(lines.len(), 11);
}

#[test]
fn test_colonies_restart_with_fewer_vehicles() {
    let problem = create_overloaded_seed_problem();
    let seed = ConstructionHeuristic::Gambardella1999
        .build(&problem)
        .unwrap();
    assert_eq!(seed.vehicle_count, 3);

    let config = Config::new()
        .with_seed(7)
        .with_time_limit(Duration::from_secs(1));
    let mut algorithm = MacsVrptw::new(problem, config).with_logger(SolutionLogger::new());
    let solution = algorithm.run().unwrap().clone();

    assert!(algorithm.restarts >= 1);
    assert_eq!(solution.vehicle_count, 2);
    assert!(algorithm.problem.is_feasible(&solution));

    let entries = algorithm.logger.as_ref().unwrap().entries();
    assert_eq!(entries[0].vehicle_count, 3);
    assert!(entries.iter().any(|entry| entry.vehicle_count == 2));
    for pair in entries.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        assert!(
            after.vehicle_count < before.vehicle_count
                || (after.vehicle_count == before.vehicle_count
                    && after.distance < before.distance)
        );
    }
}
