//! Command-processing loop
//!
//! One iteration polls the channel, composes the command into poses and
//! drives the servos through each pose before polling again. The pose model
//! is owned here and mutated by nothing else.
//!
//! Failure policy:
//!
//! | Error | Effect |
//! |-------|--------|
//! | kinematic rejection | command dropped, model unchanged |
//! | `ConvergenceStalled` | rest of the command's poses skipped |
//! | `Interrupted` | rest of the command's poses skipped, interrupt handled next |
//! | anything else | torque disabled, error returned |

use crate::command::{Accepted, CommandChannel, CommandSource, Request};
use crate::config::{AppConfig, SpeedConfig};
use crate::error::{Error, Result};
use crate::servo::{ConvergenceLoop, ServoBus};
use log::{debug, error, info, warn};
use pada_kine::{ComposedPose, MoveKind, Sequencer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// What the loop should do after one iteration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Nothing was pending
    Idle,
    /// A command was handled
    Handled,
    /// Exit requested
    Exit,
}

/// Owns the pose model, the servo bus and the command channel
pub struct Processor<B: ServoBus, S: CommandSource> {
    sequencer: Sequencer,
    bus: B,
    channel: CommandChannel<S>,
    convergence: ConvergenceLoop,
    speed: SpeedConfig,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
    torque: bool,
}

impl<B: ServoBus, S: CommandSource> Processor<B, S> {
    pub fn new(config: &AppConfig, bus: B, source: S, running: Arc<AtomicBool>) -> Result<Self> {
        Ok(Self {
            sequencer: Sequencer::new(&config.kinematics)?,
            bus,
            channel: CommandChannel::new(source, config.speed.clone()),
            convergence: ConvergenceLoop::new(&config.servo, config.speed.min),
            speed: config.speed.clone(),
            poll_interval: Duration::from_millis(config.command.poll_interval_ms),
            running,
            torque: true,
        })
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn torque_enabled(&self) -> bool {
        self.torque
    }

    /// Drive the servos into the model's current pose at body speed
    pub fn initialize(&mut self) -> Result<()> {
        info!("Moving to initial stance");
        let pose = ComposedPose {
            kind: MoveKind::Init,
            servo: self.sequencer.model().current_servo_pose(),
        };
        self.play(&[pose], self.speed.body)
    }

    /// Poll and handle commands until exit or shutdown
    pub fn run(&mut self) -> Result<()> {
        while self.running.load(Ordering::Relaxed) {
            match self.step()? {
                Flow::Exit => {
                    info!("Exit requested");
                    break;
                }
                Flow::Idle => thread::sleep(self.poll_interval),
                Flow::Handled => {}
            }
        }
        Ok(())
    }

    /// One loop iteration
    pub fn step(&mut self) -> Result<Flow> {
        match self.channel.next()? {
            Some(accepted) => self.dispatch(accepted),
            None => Ok(Flow::Idle),
        }
    }

    fn dispatch(&mut self, accepted: Accepted) -> Result<Flow> {
        match accepted.request {
            Request::Exit => return Ok(Flow::Exit),
            Request::DisableTorque => {
                info!("Disabling torque");
                self.bus.disable_torque()?;
                self.torque = false;
            }
            Request::EnableTorque => {
                info!("Enabling torque");
                self.bus.enable_torque()?;
                self.torque = true;
                // Servos hold wherever they were left; bring them back to the model
                self.initialize()?;
            }
            Request::Motion(command) => {
                if !self.torque {
                    warn!("Torque disabled, ignoring {}", command);
                    return Ok(Flow::Handled);
                }
                let poses = match self.sequencer.execute(command) {
                    Ok(poses) => poses,
                    Err(e) if e.is_kinematic() => {
                        warn!("Command {} rejected: {}", command, e);
                        return Ok(Flow::Handled);
                    }
                    Err(e) => return Err(self.fail(e.into())),
                };
                debug!(
                    "Command {} (id {}) composed {} poses",
                    command,
                    accepted.id,
                    poses.len()
                );
                self.play(&poses, accepted.speed)?;
            }
        }
        Ok(Flow::Handled)
    }

    /// Servo speed for one pose: body moves and running steps have their
    /// own, leg moves follow the command
    fn pose_speed(&self, kind: &MoveKind, command_speed: u32) -> u32 {
        match kind {
            MoveKind::Init | MoveKind::Body => self.speed.body,
            MoveKind::Run => self.speed.run,
            MoveKind::Foot { .. } | MoveKind::Feet { .. } => command_speed,
        }
    }

    /// Drive every pose through the convergence loop
    fn play(&mut self, poses: &[ComposedPose], speed: u32) -> Result<()> {
        for (i, pose) in poses.iter().enumerate() {
            let pose_speed = self.pose_speed(&pose.kind, speed);

            let channel = &mut self.channel;
            let running = &self.running;
            let mut interrupted =
                || !running.load(Ordering::Relaxed) || channel.interrupt_pending();

            match self
                .convergence
                .drive(&mut self.bus, &pose.servo, pose_speed, &mut interrupted)
            {
                Ok(result) => debug!(
                    "Pose {}/{} ({}) converged in {} polls, {} corrections",
                    i + 1,
                    poses.len(),
                    pose.kind.label(),
                    result.polls,
                    result.corrections
                ),
                Err(Error::Interrupted) => {
                    info!("Pose {}/{} interrupted", i + 1, poses.len());
                    return Ok(());
                }
                Err(e @ Error::ConvergenceStalled { .. }) => {
                    warn!(
                        "Pose {}/{} ({}): {}, skipping {} remaining",
                        i + 1,
                        poses.len(),
                        pose.kind.label(),
                        e,
                        poses.len() - i - 1
                    );
                    return Ok(());
                }
                Err(e) => return Err(self.fail(e)),
            }
        }
        Ok(())
    }

    /// Disable torque after a fatal error and hand the error back
    fn fail(&mut self, err: Error) -> Error {
        error!("Fatal: {}, disabling torque", err);
        if let Err(e) = self.bus.disable_torque() {
            error!("Failed to disable torque: {}", e);
        }
        self.torque = false;
        err
    }
}
