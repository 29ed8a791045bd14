//! Composer behaviour over command streams
//!
//! Run with: `cargo test --test gait_sequences`

use approx::assert_relative_eq;
use pada_kine::gait::{DiagonalPair, GaitPhase, TrotGait};
use pada_kine::{Command, KineConfig, LegId, MoveKind, Sequencer};

fn sequencer() -> Sequencer {
    Sequencer::new(&KineConfig::default()).unwrap()
}

fn feet_kinds(poses: &[pada_kine::ComposedPose]) -> Vec<MoveKind> {
    poses.iter().map(|p| p.kind.clone()).collect()
}

#[test]
fn test_held_forward_then_release() {
    let mut s = sequencer();
    let g = TrotGait::Forward;
    let mut phases = Vec::new();

    for _ in 0..3 {
        s.execute(Command::ForwardTwoLegged).unwrap();
        phases.push(s.forwarder().phase(g));
    }
    assert_eq!(
        phases,
        vec![GaitPhase::PhaseOne, GaitPhase::PhaseTwo, GaitPhase::PhaseOne]
    );

    // Release: the exit half-step swings pair 2-4 by one base step
    let poses = s.execute(Command::None).unwrap();
    assert_eq!(s.forwarder().phase(g), GaitPhase::Idle);
    assert_eq!(
        feet_kinds(&poses),
        vec![
            MoveKind::Body,
            MoveKind::Feet {
                legs: DiagonalPair::TwoFour.legs().to_vec()
            },
            MoveKind::Feet {
                legs: DiagonalPair::TwoFour.legs().to_vec()
            },
        ]
    );

    // F + 2F on pair 1-3 and 2F + F on pair 2-4: 12 cm for every foot
    let model = s.model();
    assert_relative_eq!(model.foot(LegId::One).y, 27.0, epsilon = 1e-9);
    assert_relative_eq!(model.foot(LegId::Two).y, -3.0, epsilon = 1e-9);
    assert_relative_eq!(model.foot_centroid().y, 12.0, epsilon = 1e-9);
    assert_relative_eq!(model.body_centroid().y, 12.0, epsilon = 1e-9);
}

#[test]
fn test_run_then_walk_switches_pace() {
    let mut s = sequencer();
    for _ in 0..2 {
        let poses = s.execute(Command::RunForward).unwrap();
        assert!(poses.iter().all(|p| p.kind == MoveKind::Run));
    }
    assert_eq!(s.forwarder().phase(TrotGait::RunForward), GaitPhase::PhaseTwo);

    // Run exit half-step first, then the walking half-step
    let poses = s.execute(Command::ForwardTwoLegged).unwrap();
    assert_eq!(poses.len(), 6);
    assert!(poses[..3].iter().all(|p| p.kind == MoveKind::Run));
    assert_eq!(poses[3].kind, MoveKind::Body);
    assert_eq!(
        poses[4].kind,
        MoveKind::Feet {
            legs: DiagonalPair::OneThree.legs().to_vec()
        }
    );
    assert_eq!(s.forwarder().active(), Some(TrotGait::Forward));
}

#[test]
fn test_single_press_exits_from_phase_one() {
    let mut s = sequencer();
    s.execute(Command::BackwardTwoLegged).unwrap();
    let poses = s.execute(Command::BodyToCenter).unwrap();

    // The two half-steps already leave the body centered, so the recenter
    // adds nothing to the exit half-step
    assert_eq!(poses.len(), 3);
    assert_eq!(s.forwarder().active(), None);
    let model = s.model();
    assert_relative_eq!(model.foot(LegId::One).y, 11.0, epsilon = 1e-9);
    assert_relative_eq!(model.foot(LegId::Two).y, -19.0, epsilon = 1e-9);
    assert_relative_eq!(model.foot_centroid().y, -4.0, epsilon = 1e-9);
    assert_relative_eq!(model.body_centroid().y, -4.0, epsilon = 1e-9);
}

#[test]
fn test_composed_poses_are_servo_convention() {
    let mut s = sequencer();
    let poses = s.execute(Command::Up).unwrap();
    assert_eq!(poses.len(), 1);
    let servo = poses[0].servo;
    // Standing yaw servos stay at the mount direction
    for leg in LegId::ALL {
        assert_relative_eq!(servo.leg(leg)[0], 0.0, epsilon = 0.01);
        // Knee servo is sign-flipped, so a bent knee reads positive
        assert!(servo.leg(leg)[2] > 0.0);
    }
    assert_eq!(servo, s.model().current_servo_pose());
}

#[test]
fn test_reset_returns_to_stance() {
    let mut s = sequencer();
    s.execute(Command::Up).unwrap();
    s.execute(Command::BodyLeft).unwrap();
    s.execute(Command::LookRight).unwrap();
    s.execute(Command::LookDown).unwrap();
    s.execute(Command::Reset).unwrap();

    let model = s.model();
    assert_relative_eq!(model.body_height(), 14.0, epsilon = 1e-9);
    assert_relative_eq!(model.body_centroid().x, model.foot_centroid().x, epsilon = 0.01);
    assert_eq!(s.envelope().side_look(), 0.0);
    assert_eq!(s.envelope().vertical_look(), 0.0);
    assert_eq!(s.envelope().body_offset(), (0.0, 0.0));
}

#[test]
fn test_reposition_round_trip() {
    let mut s = sequencer();
    let feet = s.model().feet();
    s.compose("reposition_x_up").unwrap();
    s.compose("reposition_y_down").unwrap();
    assert_relative_eq!(s.model().foot(LegId::One).x, 16.0, epsilon = 1e-9);
    assert_relative_eq!(s.model().foot(LegId::One).y, 14.0, epsilon = 1e-9);
    s.compose("reposition_x_down").unwrap();
    s.compose("reposition_y_up").unwrap();
    for leg in LegId::ALL {
        assert!(s.model().foot(leg).within(&feet[leg.index()], 1e-9));
    }
}
