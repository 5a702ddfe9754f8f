//! Tests for the nearest-neighbour construction heuristics.

use macs_vrptw::construction::ConstructionHeuristic;
use macs_vrptw::error::VrptwError;
use macs_vrptw::problem::{Customer, Depot, Problem};

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

/// Five by four grid around a central depot with wide windows.
fn create_grid_problem() -> Problem {
    let customers = (0..20)
        .map(|i| {
            let x = (i % 5) as f64 * 20.0 + 10.0;
            let y = (i / 5) as f64 * 25.0 + 10.0;
            Customer::new(i, x, y, (i % 3) as u32 + 1, 0.0, 1000.0, 10.0)
        })
        .collect();
    Problem::new(
        "GridProblem".to_string(),
        20,
        10,
        Depot::new(50.0, 50.0, 2000.0),
        customers,
    )
    .unwrap()
}

fn all_heuristics() -> Vec<ConstructionHeuristic> {
    vec![
        ConstructionHeuristic::Gambardella1999,
        ConstructionHeuristic::solomon(),
        ConstructionHeuristic::ellabib(),
    ]
}

#[test]
fn test_line_problem_uses_one_vehicle() {
    let problem = create_test_problem();

    for heuristic in all_heuristics() {
        let solution = heuristic.build(&problem).unwrap();
        assert_eq!(solution.vehicle_count, 1, "{}", heuristic.name());
        assert_eq!(solution.tours, vec![0, 1, -1], "{}", heuristic.name());
        assert!((solution.distance - 40.0).abs() < 1e-9);
        assert!(problem.is_feasible(&solution));
    }
}

#[test]
fn test_exclusive_windows_open_second_vehicle() {
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

    let solution = ConstructionHeuristic::Gambardella1999
        .build(&problem)
        .unwrap();

    // ties go to the lowest id
    assert_eq!(solution.vehicle_count, 2);
    assert_eq!(solution.tours, vec![0, -1, 1, -1]);
    assert!((solution.distance - 40.0).abs() < 1e-9);
}

#[test]
fn test_unservable_customer_is_reported() {
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

    match ConstructionHeuristic::Gambardella1999.build(&problem) {
        Err(VrptwError::UnservableCustomers(unserved)) => assert_eq!(unserved, vec![0]),
        other => panic!("expected unservable customers, got {:?}", other),
    }
}

#[test]
fn test_invalid_weights_are_rejected() {
    let problem = create_test_problem();

    let negative = ConstructionHeuristic::Solomon1987 {
        w1: -1.0,
        w2: 0.5,
        w3: 0.5,
    };
    assert!(matches!(
        negative.build(&problem),
        Err(VrptwError::Configuration(_))
    ));

    let zero = ConstructionHeuristic::Ellabib2002 { w1: 0.0, w2: 0.0 };
    assert!(matches!(
        zero.build(&problem),
        Err(VrptwError::Configuration(_))
    ));

    let not_a_number = ConstructionHeuristic::Ellabib2002 {
        w1: f64::NAN,
        w2: 1.0,
    };
    assert!(matches!(
        not_a_number.build(&problem),
        Err(VrptwError::Configuration(_))
    ));
}

#[test]
fn test_unnormalized_weights_behave_like_normalized() {
    let problem = create_grid_problem();

    let scaled = ConstructionHeuristic::Solomon1987 {
        w1: 4.0,
        w2: 4.0,
        w3: 2.0,
    };
    let a = scaled.build(&problem).unwrap();
    let b = ConstructionHeuristic::solomon().build(&problem).unwrap();

    assert_eq!(a.tours, b.tours);
    assert_eq!(a.vehicle_count, b.vehicle_count);
}

#[test]
fn test_construct_stores_solution() {
    let mut problem = create_test_problem();
    assert!(problem.solution.is_none());

    ConstructionHeuristic::Gambardella1999
        .construct(&mut problem)
        .unwrap();

    assert!(problem.solution.is_some());
    assert!(problem.is_solution_feasible());
}

#[test]
fn test_grid_problem_is_feasible_for_all_heuristics() {
    let problem = create_grid_problem();

    for heuristic in all_heuristics() {
        let solution = heuristic.build(&problem).unwrap();
        assert!(problem.is_feasible(&solution), "{}", heuristic.name());

        let sentinels = solution.tours.iter().filter(|&&e| e == -1).count();
        assert_eq!(sentinels, solution.vehicle_count);
        assert!(solution.vehicle_count >= 4);

        let matrix = solution.to_tour_matrix(problem.customer_count()).unwrap();
        let recomputed = problem.evaluate_tours(&matrix).unwrap();
        assert!((recomputed - solution.distance).abs() < 1e-6);
    }
}

#[test]
fn test_heuristic_names() {
    assert_eq!(
        ConstructionHeuristic::Gambardella1999.name(),
        "nn_gambardella1999"
    );
    assert_eq!(ConstructionHeuristic::solomon().name(), "nn_solomon1987");
    assert_eq!(ConstructionHeuristic::ellabib().name(), "nn_ellabib2002");
}
