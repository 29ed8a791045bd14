//! Planner scenarios
//!
//! Every scenario starts from the default stance and searches over
//! advance-by-8, advance-by-12 and raise-by-2.
//!
//! Run with: `cargo test --test planner`

use pada_kine::config::ObstacleConfig;
use pada_kine::core::Segment3;
use pada_kine::planner::parse_obstacles;
use pada_kine::{Error, KineConfig, Obstacle, PlanMove, Planner, Point, PoseModel};

const ALPHABET: [PlanMove; 3] = [
    PlanMove::Advance(8.0),
    PlanMove::Advance(12.0),
    PlanMove::Raise(2.0),
];

fn start() -> (KineConfig, PoseModel) {
    let config = KineConfig::default();
    let model = PoseModel::new(&config).unwrap();
    (config, model)
}

fn moves(attempt: &pada_kine::planner::Attempt) -> Vec<PlanMove> {
    attempt.plan.iter().map(|m| m.movement).collect()
}

#[test]
fn test_open_ground_prefers_cheapest_plan() {
    let (config, model) = start();
    let planner = Planner::new(&config, Vec::new());

    let attempt = planner.search(&model, &ALPHABET, (0.0, 8.0), 2).unwrap();
    assert!(attempt.cost > 0.0);

    // Every single-move success is also a candidate, so the winner is at
    // least as cheap as the plain advance
    let plain = planner
        .simulate(&model, &[PlanMove::Advance(8.0)], (0.0, 8.0))
        .unwrap();
    assert!(plain.reached);
    assert!(attempt.cost <= plain.cost);
}

#[test]
fn test_unreachable_target_exhausts() {
    let (config, model) = start();
    let planner = Planner::new(&config, Vec::new());

    match planner.search(&model, &ALPHABET, (0.0, 1000.0), 2) {
        Err(Error::PlanExhausted { evaluated }) => assert_eq!(evaluated, 3 + 9),
        other => panic!("expected exhaustion, got {:?}", other.map(|a| a.cost)),
    }
}

#[test]
fn test_raises_body_before_stepping_onto_box() {
    let (config, model) = start();
    let obstacles = parse_obstacles("-20,24,0,20,34,3", &config.obstacle).unwrap();
    let planner = Planner::new(&config, obstacles);

    let attempt = planner.search(&model, &ALPHABET, (0.0, 10.0), 2).unwrap();
    assert_eq!(
        moves(&attempt),
        vec![PlanMove::Raise(2.0), PlanMove::Advance(12.0)]
    );

    // Front feet end on top of the box, rear feet on the ground
    let last = &attempt.plan[1].targets;
    assert_eq!(last[0].z, 3.0);
    assert_eq!(last[3].z, 3.0);
    assert_eq!(last[1].z, 0.0);
    assert_eq!(last[2].z, 0.0);
}

#[test]
fn test_rejected_prefixes_are_pruned() {
    let (config, model) = start();
    let obstacles = parse_obstacles("-20,24,0,20,34,3", &config.obstacle).unwrap();
    let planner = Planner::new(&config, obstacles);

    assert!(
        planner
            .simulate(&model, &[PlanMove::Advance(8.0)], (0.0, 10.0))
            .is_err()
    );
    assert!(
        planner
            .simulate(&model, &[PlanMove::Advance(12.0)], (0.0, 10.0))
            .is_err()
    );

    // Both advances fail at length one, so only raise-prefixed pairs remain
    let attempt = planner.search(&model, &ALPHABET, (0.0, 10.0), 2).unwrap();
    assert_eq!(attempt.evaluated, 3 + 3);
}

#[test]
fn test_collision_box_from_literal_coordinates() {
    let obstacle = Obstacle::new(
        Point::new(10.0, 10.0, 0.0),
        Point::new(20.0, 20.0, 5.0),
        &ObstacleConfig {
            danger_margin: 1.0,
            outer_danger_margin: 2.0,
        },
    );
    let through = Segment3::new(Point::new(0.0, 15.0, 2.0), Point::new(30.0, 15.0, 2.0));
    let beside = Segment3::new(Point::new(0.0, 0.0, 2.0), Point::new(30.0, 0.0, 2.0));
    assert!(obstacle.intersects(&through));
    assert!(!obstacle.intersects(&beside));
}
