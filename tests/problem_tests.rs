//! Tests for the instance model, the feasibility check and the instance parser.

use macs_vrptw::error::VrptwError;
use macs_vrptw::problem::{Customer, Depot, KnownSolution, Problem};
use macs_vrptw::solution::Solution;

/// Depot at the origin and two customers on a line, one vehicle suffices.
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

/// Two customers whose windows cannot both be met by one vehicle.
fn create_exclusive_windows_problem() -> Problem {
    let customers = vec![
        Customer::new(0, 10.0, 0.0, 1, 0.0, 15.0, 0.0),
        Customer::new(1, 0.0, 10.0, 1, 0.0, 15.0, 0.0),
    ];
    Problem::new(
        "ExclusiveWindows".to_string(),
        2,
        10,
        Depot::new(0.0, 0.0, 100.0),
        customers,
    )
    .unwrap()
}

const SOLOMON_INSTANCE: &str = "C101

VEHICLE
NUMBER     CAPACITY
  25         200

CUSTOMER
CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE   TIME

    0      40         50          0          0       1236          0
    1      45         68         10        912        967         90
    2      45         70         30        825        870         90
    3      42         66         10         65        146         90
";

#[test]
fn test_distance_matrix_properties() {
    let problem = create_test_problem();
    let matrix = problem.distances();

    assert_eq!(matrix.size(), 3);
    for i in 0..3 {
        assert_eq!(matrix.get(i, i), 0.0);
        for j in 0..3 {
            assert_eq!(matrix.get(i, j), matrix.get(j, i));
        }
    }

    assert_eq!(problem.distance(0, 1), 10.0);
    assert_eq!(problem.depot_distance(0), 10.0);
    assert_eq!(problem.depot_distance(1), 20.0);
}

#[test]
fn test_duplicated_depot_ids_map_to_depot() {
    let problem = create_test_problem();
    assert_eq!(problem.depot_index(), 2);

    // ids 2, 3, 4 all denote the depot
    assert_eq!(problem.distance(3, 1), 20.0);
    assert_eq!(problem.distance(0, 4), 10.0);
    assert_eq!(problem.distance(3, 4), 0.0);
}

#[test]
fn test_single_vehicle_solution_is_feasible() {
    let problem = create_test_problem();
    let solution = Solution::new(1, 40.0, vec![0, 1, -1]);

    assert!(problem.is_feasible(&solution));
    assert_eq!(problem.check_route(&[0, 1]), Some(40.0));
    assert_eq!(problem.route_distance(&[1, 0]), 40.0);
}

#[test]
fn test_demand_exceeding_capacity_is_infeasible() {
    let customers = vec![
        Customer::new(0, 10.0, 0.0, 15, 0.0, 1000.0, 0.0),
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

    assert!(!problem.is_feasible(&Solution::new(1, 40.0, vec![0, 1, -1])));
    assert!(!problem.is_feasible(&Solution::new(2, 60.0, vec![0, -1, 1, -1])));
    assert_eq!(problem.check_route(&[0]), None);
    assert!(problem.check_route(&[1]).is_some());
}

#[test]
fn test_exclusive_windows_need_two_vehicles() {
    let problem = create_exclusive_windows_problem();

    assert!(!problem.is_feasible(&Solution::new(1, 0.0, vec![0, 1, -1])));
    assert!(!problem.is_feasible(&Solution::new(1, 0.0, vec![1, 0, -1])));
    assert!(problem.is_feasible(&Solution::new(2, 40.0, vec![0, -1, 1, -1])));
}

#[test]
fn test_coverage_violations_are_infeasible() {
    let problem = create_test_problem();

    // customer 1 missing
    assert!(!problem.is_feasible(&Solution::new(1, 20.0, vec![0, -1])));
    // customer 0 twice
    assert!(!problem.is_feasible(&Solution::new(2, 0.0, vec![0, 1, -1, 0, -1])));
    // id out of range
    assert!(!problem.is_feasible(&Solution::new(1, 0.0, vec![0, 1, 7, -1])));
    // vehicle count does not match the number of tours
    assert!(!problem.is_feasible(&Solution::new(2, 40.0, vec![0, 1, -1])));
    // unterminated tour
    assert!(!problem.is_feasible(&Solution::new(1, 40.0, vec![0, -1, 1])));
}

#[test]
fn test_waiting_and_depot_due_date() {
    let customers = vec![Customer::new(0, 10.0, 0.0, 1, 50.0, 60.0, 5.0)];
    let problem = Problem::new(
        "Waiting".to_string(),
        1,
        10,
        Depot::new(0.0, 0.0, 65.0),
        customers.clone(),
    )
    .unwrap();
    // arrive at 10, wait until 50, serve until 55, back at 65
    assert_eq!(problem.check_route(&[0]), Some(20.0));

    let tight = Problem::new(
        "TightDepot".to_string(),
        1,
        10,
        Depot::new(0.0, 0.0, 64.0),
        customers,
    )
    .unwrap();
    assert_eq!(tight.check_route(&[0]), None);
}

#[test]
fn test_new_rejects_mismatched_ids() {
    let customers = vec![Customer::new(1, 10.0, 0.0, 1, 0.0, 100.0, 0.0)];
    let result = Problem::new(
        "BadIds".to_string(),
        1,
        10,
        Depot::new(0.0, 0.0, 100.0),
        customers,
    );
    assert!(matches!(result, Err(VrptwError::Configuration(_))));
}

#[test]
fn test_set_solution_and_known_solutions() {
    let mut problem = create_test_problem().with_known_solutions(
        Some(KnownSolution {
            vehicle_count: 1,
            distance: 40.0,
            authors: "test".to_string(),
        }),
        None,
    );
    assert!(!problem.is_solution_feasible());

    problem.set_solution(Solution::new(1, 40.0, vec![1, 0, -1]));
    assert!(problem.is_solution_feasible());
    assert_eq!(problem.optimal.as_ref().unwrap().vehicle_count, 1);
    assert!(problem.best_heuristic.is_none());
}

#[test]
fn test_parse_solomon_instance() {
    let problem = Problem::parse(SOLOMON_INSTANCE).unwrap();

    assert_eq!(problem.name, "C101");
    assert_eq!(problem.vehicle_count, 25);
    assert_eq!(problem.capacity, 200);
    assert_eq!(problem.customer_count(), 3);
    assert_eq!(problem.depot.due_date, 1236.0);

    let first = &problem.customers[0];
    assert_eq!(first.id, 0);
    assert_eq!((first.x, first.y), (45.0, 68.0));
    assert_eq!(first.demand, 10);
    assert_eq!(first.ready_time, 912.0);
    assert_eq!(first.due_date, 967.0);
    assert_eq!(first.service_time, 90.0);

    let expected = (25.0f64 + 324.0).sqrt();
    assert!((problem.depot_distance(0) - expected).abs() < 1e-12);
}

#[test]
fn test_parse_reports_line_of_bad_header() {
    let content = SOLOMON_INSTANCE.replace("VEHICLE", "FLEET");
    match Problem::parse(&content) {
        Err(VrptwError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {:?}", other.map(|p| p.name)),
    }
}

#[test]
fn test_parse_rejects_non_sequential_customers() {
    let content = SOLOMON_INSTANCE.replace("    3      42", "    4      42");
    match Problem::parse(&content) {
        Err(VrptwError::Parse { line, .. }) => assert_eq!(line, 13),
        other => panic!("expected parse error, got {:?}", other.map(|p| p.name)),
    }
}

#[test]
fn test_parse_rejects_invalid_number() {
    let content = SOLOMON_INSTANCE.replace("  25         200", "  25         abc");
    assert!(matches!(
        Problem::parse(&content),
        Err(VrptwError::Parse { line: 5, .. })
    ));
}

#[test]
fn test_parse_rejects_values_beyond_integer_range() {
    let capacity = SOLOMON_INSTANCE.replace("  25         200", "  25         99999999999");
    assert!(matches!(
        Problem::parse(&capacity),
        Err(VrptwError::Parse { line: 5, .. })
    ));

    let demand = SOLOMON_INSTANCE.replace("70         30", "70         5000000000");
    assert!(matches!(
        Problem::parse(&demand),
        Err(VrptwError::Parse { line: 12, .. })
    ));

    let huge = SOLOMON_INSTANCE.replace("  25         200", "  1e30         200");
    assert!(matches!(
        Problem::parse(&huge),
        Err(VrptwError::Parse { line: 5, .. })
    ));
}

#[test]
fn test_from_file_missing_file() {
    let result = Problem::from_file("does/not/exist.txt");
    assert!(matches!(result, Err(VrptwError::Io(_))));
}
