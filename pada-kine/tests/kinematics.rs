//! Solver and pose model laws
//!
//! - solve then forward kinematics reproduces the target
//! - servo conversion round-trips at its rounding precision
//! - body moves are undone by their inverse
//! - recentering is a fixed point
//!
//! Run with: `cargo test --test kinematics`

use approx::assert_relative_eq;
use pada_kine::pose::{from_servo, to_servo};
use pada_kine::{Error, KineConfig, LegId, LegSolver, Point, PoseModel};

// ============================================================================
// Helpers
// ============================================================================

fn default_model() -> PoseModel {
    PoseModel::new(&KineConfig::default()).expect("default stance must solve")
}

// ============================================================================
// Inverse kinematics
// ============================================================================

#[test]
fn test_solve_reconstructs_every_reachable_target() {
    let config = KineConfig::default();
    let solver = LegSolver::new(&config);
    let hip = Point::new(3.8, 3.8, 14.0);

    let mut solved = 0;
    let mut unreachable = 0;
    let mut violated = 0;
    for xi in 0..14 {
        for yi in 0..14 {
            for zi in 0..5 {
                let foot = Point::new(9.0 + xi as f64, 9.0 + yi as f64, -4.0 + 2.0 * zi as f64);
                match solver.solve(hip, foot, LegId::One) {
                    Ok(angles) => {
                        solved += 1;
                        let rebuilt = solver.foot_position(hip, &angles);
                        assert!(
                            rebuilt.within(&foot, 0.01),
                            "target {} rebuilt as {}",
                            foot,
                            rebuilt
                        );
                    }
                    Err(Error::Unreachable { .. }) => unreachable += 1,
                    Err(Error::ConstraintViolated { .. }) => violated += 1,
                    Err(other) => panic!("unexpected error {:?}", other),
                }
            }
        }
    }
    assert!(solved > 100, "only {} targets solved", solved);
    assert_eq!(solved + unreachable + violated, 14 * 14 * 5);
}

#[test]
fn test_cache_serves_repeated_requests() {
    let config = KineConfig::default();
    let solver = LegSolver::new(&config);
    let hip = Point::new(3.8, 3.8, 14.0);
    let foot = Point::new(16.0, 14.0, 0.0);

    let first = solver.solve(hip, foot, LegId::One).unwrap();
    let misses = solver.cache().misses();
    let second = solver.solve(hip, foot, LegId::One).unwrap();
    assert_eq!(first, second);
    assert_eq!(solver.cache().misses(), misses);
    assert!(solver.cache().hits() >= 1);
}

// ============================================================================
// Pose model
// ============================================================================

#[test]
fn test_servo_round_trip_on_model_poses() {
    let mut model = default_model();
    model.move_body(1.0, -2.0, 1.0).unwrap();
    model.move_foot(LegId::Three, -1.0, 2.0, 4.0).unwrap();

    let config = KineConfig::default();
    for snapshot in model.history() {
        let servo = to_servo(&snapshot.angles, &config.servo_map);
        let back = from_servo(&servo, &config.servo_map);
        for leg in LegId::ALL {
            let original = snapshot.leg(leg);
            let restored = back[leg.index()];
            assert_relative_eq!(original.tetta, restored.tetta, epsilon = 2e-4);
            assert_relative_eq!(original.alpha, restored.alpha, epsilon = 2e-4);
            assert_relative_eq!(original.beta, restored.beta, epsilon = 2e-4);
            assert_relative_eq!(original.gamma, restored.gamma, epsilon = 2e-4);
        }
        assert_eq!(to_servo(&back, &config.servo_map), servo);
    }
}

#[test]
fn test_body_move_inverse_restores_points() {
    let mut model = default_model();
    let hips = model.hips();
    let feet = model.feet();

    for &(dx, dy, dz) in &[(2.0, 0.0, 0.0), (0.0, -3.0, 1.0), (1.5, 1.5, -2.0)] {
        model.move_body(dx, dy, dz).unwrap();
        model.move_body(-dx, -dy, -dz).unwrap();
    }

    for leg in LegId::ALL {
        assert!(model.hip(leg).within(&hips[leg.index()], 1e-9));
        assert_eq!(model.foot(leg), feet[leg.index()]);
    }
}

#[test]
fn test_recenter_twice_is_noop() {
    let mut model = default_model();
    model.move_foot(LegId::Two, 1.0, 3.0, 0.0).unwrap();
    model.move_foot(LegId::Four, -1.0, 2.0, 0.0).unwrap();
    model.recenter_body().unwrap();

    let snapshots = model.history().len();
    model.recenter_body().unwrap();
    assert_eq!(model.history().len(), snapshots);

    let centroid = model.body_centroid();
    let feet = model.foot_centroid();
    assert_relative_eq!(centroid.x, feet.x, epsilon = 0.01);
    assert_relative_eq!(centroid.y, feet.y, epsilon = 0.01);
}

#[test]
fn test_rejected_move_leaves_model_intact() {
    let mut model = default_model();
    let legs = model.legs().clone();
    let history = model.history().len();

    assert!(model.move_body(0.0, 0.0, 40.0).is_err());
    assert!(model.move_foot(LegId::One, 25.0, 25.0, 0.0).is_err());

    assert_eq!(model.legs(), &legs);
    assert_eq!(model.history().len(), history);
}
