//! Command loop against the mock servo bus
//!
//! Run with: `cargo test --test command_loop`

use chalan_io::command::{CommandRecord, FileCommandSource, QueueCommandSource, Request};
use chalan_io::{AppConfig, Error, Flow, MockServoBus, Processor};
use pada_kine::Command;
use pada_kine::gait::{GaitPhase, TrotGait};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// Helpers
// ============================================================================

fn quick_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.servo.poll_interval_ms = 0;
    config.servo.settle_delay_ms = 0;
    config.command.poll_interval_ms = 0;
    config
}

fn motion(id: u64, command: Command) -> CommandRecord {
    CommandRecord::new(id, Request::Motion(command), None)
}

fn queue_processor(
    config: &AppConfig,
    bus: &MockServoBus,
) -> (
    QueueCommandSource,
    Arc<AtomicBool>,
    Processor<MockServoBus, QueueCommandSource>,
) {
    let queue = QueueCommandSource::new();
    let running = Arc::new(AtomicBool::new(true));
    let processor =
        Processor::new(config, bus.clone(), queue.clone(), Arc::clone(&running)).unwrap();
    (queue, running, processor)
}

// ============================================================================
// Interrupts and failures
// ============================================================================

#[test]
fn test_disable_torque_interrupts_convergence() {
    let mut bus = MockServoBus::default();
    bus.set_fraction(0.05);
    let (queue, _, mut p) = queue_processor(&quick_config(), &bus);

    queue.push(motion(1, Command::Up));
    queue.push(CommandRecord::new(2, Request::DisableTorque, None));

    // The disable is found while the Up pose is still converging
    assert_eq!(p.step().unwrap(), Flow::Handled);
    assert_eq!(bus.issued().len(), 1);
    assert!(bus.torque_enabled());

    assert_eq!(p.step().unwrap(), Flow::Handled);
    assert_eq!(bus.torque_events(), vec![false]);
    assert!(!p.torque_enabled());
}

#[test]
fn test_convergence_failure_disables_torque() {
    let mut bus = MockServoBus::default();
    bus.set_fraction(0.5);
    bus.stall_after(Some(1));
    let (queue, _, mut p) = queue_processor(&quick_config(), &bus);

    queue.push(motion(1, Command::Up));
    assert!(matches!(p.step(), Err(Error::ConvergenceFailed { .. })));
    assert_eq!(bus.torque_events(), vec![false]);
    assert!(!p.torque_enabled());
}

#[test]
fn test_stall_skips_rest_of_command() {
    let mut config = quick_config();
    config.servo.tolerance = 0.01;
    config.servo.catastrophic_factor = 1.0e6;
    config.servo.max_polls = 5;

    let mut bus = MockServoBus::default();
    bus.set_fraction(1.0);
    let (queue, _, mut p) = queue_processor(&config, &bus);
    p.initialize().unwrap();

    bus.stall_after(Some(0));
    queue.push(motion(1, Command::ForwardOneLegged));
    assert_eq!(p.step().unwrap(), Flow::Handled);

    // First pose plus its one correction, nothing after it
    let issued = bus.issued();
    assert_eq!(issued.len(), 3);
    assert_eq!(issued[2].1, 0);
    assert!(p.torque_enabled());
}

#[test]
fn test_shutdown_flag_interrupts() {
    let bus = MockServoBus::default();
    let (queue, running, mut p) = queue_processor(&quick_config(), &bus);

    running.store(false, Ordering::Relaxed);
    queue.push(motion(1, Command::Up));
    assert_eq!(p.step().unwrap(), Flow::Handled);
    assert_eq!(bus.issued().len(), 1);

    // run() returns at once with the flag cleared
    queue.push(motion(2, Command::Down));
    p.run().unwrap();
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_exit_stops_run() {
    let mut bus = MockServoBus::default();
    bus.set_fraction(1.0);
    let (queue, _, mut p) = queue_processor(&quick_config(), &bus);

    queue.push(motion(1, Command::Up));
    queue.push(CommandRecord::new(2, Request::Exit, None));
    queue.push(motion(3, Command::Down));
    p.run().unwrap();

    assert_eq!(bus.issued().len(), 1);
    assert_eq!(queue.len(), 1);
}

// ============================================================================
// File channel
// ============================================================================

#[test]
fn test_file_channel_dedup_and_speed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chalan.cmd");
    let mut bus = MockServoBus::default();
    bus.set_fraction(1.0);
    let running = Arc::new(AtomicBool::new(true));
    let mut p = Processor::new(
        &quick_config(),
        bus.clone(),
        FileCommandSource::new(&path),
        running,
    )
    .unwrap();

    assert_eq!(p.step().unwrap(), Flow::Idle);

    // Held trot re-fires on every poll with the same id
    fs::write(&path, "5,forward_two_legged,400\n").unwrap();
    assert_eq!(p.step().unwrap(), Flow::Handled);
    assert_eq!(p.step().unwrap(), Flow::Handled);
    assert_eq!(
        p.sequencer().forwarder().phase(TrotGait::Forward),
        GaitPhase::PhaseTwo
    );

    // A one-shot command runs once
    fs::write(&path, "6,body_to_center,400\n").unwrap();
    assert_eq!(p.step().unwrap(), Flow::Handled);
    assert_eq!(p.step().unwrap(), Flow::Idle);
    assert_eq!(p.sequencer().forwarder().active(), None);

    // Out-of-range speed is ignored outright
    let issued = bus.issued().len();
    fs::write(&path, "7,up,5\n").unwrap();
    assert_eq!(p.step().unwrap(), Flow::Idle);
    assert_eq!(bus.issued().len(), issued);
}
