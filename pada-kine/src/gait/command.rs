//! Command vocabulary and the composer that turns commands into poses.

use log::{debug, info, warn};
use std::fmt;
use std::str::FromStr;

use super::envelope::Envelope;
use super::forwarder::{Forwarder, TrotGait, TrotStep};
use super::primitives::{
    BACKWARD_ORDER, FORWARD_ORDER, GaitPrimitives, STRAFE_LEFT_ORDER, STRAFE_RIGHT_ORDER,
};
use crate::config::KineConfig;
use crate::error::{Error, Result};
use crate::ik::LegSolver;
use crate::pose::{MoveKind, PoseModel, ServoPose};

/// Symbolic locomotion commands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    ForwardTwoLegged,
    BackwardTwoLegged,
    StrafeLeftTwoLegged,
    StrafeRightTwoLegged,
    RunForward,
    RunBackward,
    RunStrafeLeft,
    RunStrafeRight,
    ForwardOneLegged,
    BackwardOneLegged,
    StrafeLeftOneLegged,
    StrafeRightOneLegged,
    BodyForward,
    BodyBackward,
    BodyLeft,
    BodyRight,
    BodyToCenter,
    Up,
    Down,
    TurnLeft,
    TurnRight,
    TurnLeftOneLegged,
    TurnRightOneLegged,
    ClimbUp,
    ClimbDown,
    LookLeft,
    LookRight,
    LookUp,
    LookDown,
    SightToNormal,
    RepositionXUp,
    RepositionXDown,
    RepositionYUp,
    RepositionYDown,
    Reset,
    None,
}

const NAMES: [(Command, &str); 36] = [
    (Command::ForwardTwoLegged, "forward_two_legged"),
    (Command::BackwardTwoLegged, "backward_two_legged"),
    (Command::StrafeLeftTwoLegged, "strafe_left_two_legged"),
    (Command::StrafeRightTwoLegged, "strafe_right_two_legged"),
    (Command::RunForward, "run_forward"),
    (Command::RunBackward, "run_backward"),
    (Command::RunStrafeLeft, "run_strafe_left"),
    (Command::RunStrafeRight, "run_strafe_right"),
    (Command::ForwardOneLegged, "forward_one_legged"),
    (Command::BackwardOneLegged, "backward_one_legged"),
    (Command::StrafeLeftOneLegged, "strafe_left_one_legged"),
    (Command::StrafeRightOneLegged, "strafe_right_one_legged"),
    (Command::BodyForward, "body_forward"),
    (Command::BodyBackward, "body_backward"),
    (Command::BodyLeft, "body_left"),
    (Command::BodyRight, "body_right"),
    (Command::BodyToCenter, "body_to_center"),
    (Command::Up, "up"),
    (Command::Down, "down"),
    (Command::TurnLeft, "turn_left"),
    (Command::TurnRight, "turn_right"),
    (Command::TurnLeftOneLegged, "turn_left_one_legged"),
    (Command::TurnRightOneLegged, "turn_right_one_legged"),
    (Command::ClimbUp, "climb_up"),
    (Command::ClimbDown, "climb_down"),
    (Command::LookLeft, "look_left"),
    (Command::LookRight, "look_right"),
    (Command::LookUp, "look_up"),
    (Command::LookDown, "look_down"),
    (Command::SightToNormal, "sight_to_normal"),
    (Command::RepositionXUp, "reposition_x_up"),
    (Command::RepositionXDown, "reposition_x_down"),
    (Command::RepositionYUp, "reposition_y_up"),
    (Command::RepositionYDown, "reposition_y_down"),
    (Command::Reset, "reset"),
    (Command::None, "none"),
];

impl Command {
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(command, _)| *command == self)
            .map(|(_, name)| *name)
            .unwrap_or("none")
    }

    /// Commands that re-fire on every poll while the operator holds them
    pub fn is_continuous(self) -> bool {
        matches!(
            self,
            Command::ForwardTwoLegged
                | Command::BackwardTwoLegged
                | Command::StrafeLeftTwoLegged
                | Command::StrafeRightTwoLegged
                | Command::RunForward
                | Command::RunBackward
                | Command::RunStrafeLeft
                | Command::RunStrafeRight
                | Command::Up
                | Command::Down
                | Command::BodyForward
                | Command::BodyBackward
                | Command::BodyLeft
                | Command::BodyRight
                | Command::TurnLeft
                | Command::TurnRight
                | Command::LookLeft
                | Command::LookRight
                | Command::LookUp
                | Command::LookDown
        )
    }

    /// Trot gait driven by this command, if any
    pub fn trot_gait(self) -> Option<TrotGait> {
        match self {
            Command::ForwardTwoLegged => Some(TrotGait::Forward),
            Command::BackwardTwoLegged => Some(TrotGait::Backward),
            Command::StrafeLeftTwoLegged => Some(TrotGait::StrafeLeft),
            Command::StrafeRightTwoLegged => Some(TrotGait::StrafeRight),
            Command::RunForward => Some(TrotGait::RunForward),
            Command::RunBackward => Some(TrotGait::RunBackward),
            Command::RunStrafeLeft => Some(TrotGait::RunLeft),
            Command::RunStrafeRight => Some(TrotGait::RunRight),
            _ => None,
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(command, _)| *command)
            .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One pose of a composed command, in servo convention
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedPose {
    pub kind: MoveKind,
    pub servo: ServoPose,
}

/// Maps commands onto gait primitives with all-or-nothing semantics
///
/// Each command runs against scratch copies of the pose model, the forwarder
/// and the envelope. The copies replace the originals only when every
/// primitive succeeds.
#[derive(Clone, Debug)]
pub struct Sequencer {
    primitives: GaitPrimitives,
    model: PoseModel,
    forwarder: Forwarder,
    envelope: Envelope,
}

/// Mutable state a command works on
struct Scratch {
    model: PoseModel,
    forwarder: Forwarder,
    envelope: Envelope,
}

impl Sequencer {
    pub fn new(config: &KineConfig) -> Result<Self> {
        Self::with_solver(config, LegSolver::new(config))
    }

    pub fn with_solver(config: &KineConfig, solver: LegSolver) -> Result<Self> {
        Ok(Self {
            primitives: GaitPrimitives::new(config),
            model: PoseModel::with_solver(config, solver)?,
            forwarder: Forwarder::new(),
            envelope: Envelope::new(config.envelope.clone()),
        })
    }

    pub fn model(&self) -> &PoseModel {
        &self.model
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn primitives(&self) -> &GaitPrimitives {
        &self.primitives
    }

    /// Parse and execute a command by name
    pub fn compose(&mut self, name: &str) -> Result<Vec<ComposedPose>> {
        let command: Command = name.parse()?;
        self.execute(command)
    }

    /// Execute a command, returning its poses in servo convention
    ///
    /// An envelope violation drops the command and yields no poses. Solver
    /// errors are returned with the model left as it was.
    pub fn execute(&mut self, command: Command) -> Result<Vec<ComposedPose>> {
        let mut scratch = Scratch {
            model: self.model.clone(),
            forwarder: self.forwarder.clone(),
            envelope: self.envelope.clone(),
        };
        scratch.model.begin_command();

        match self.run(&mut scratch, command) {
            Ok(()) => {}
            Err(err @ Error::EnvelopeExceeded { .. }) => {
                warn!("Dropping {}: {}", command, err);
                return Ok(Vec::new());
            }
            Err(err) => {
                warn!("Command {} failed: {}", command, err);
                return Err(err);
            }
        }

        let snapshots = scratch.model.drain();
        let poses: Vec<ComposedPose> = snapshots
            .iter()
            .map(|snapshot| ComposedPose {
                kind: snapshot.kind.clone(),
                servo: scratch.model.to_servo(snapshot),
            })
            .collect();

        info!("Command {} composed {} poses", command, poses.len());
        self.model = scratch.model;
        self.forwarder = scratch.forwarder;
        self.envelope = scratch.envelope;
        Ok(poses)
    }

    fn run_trot_step(&self, model: &mut PoseModel, step: TrotStep) -> Result<()> {
        let pace = step.gait.pace();
        let (stride, _) = self.primitives.stride(pace);
        let (dx, dy) = step.delta(stride);
        debug!(
            "Trot {:?} pair {:?} by ({:.1}, {:.1})",
            step.gait, step.pair, dx, dy
        );
        self.primitives.trot(model, step.pair, dx, dy, pace)
    }

    fn run(&self, s: &mut Scratch, command: Command) -> Result<()> {
        if let Some(gait) = command.trot_gait() {
            for step in s.forwarder.advance(gait) {
                self.run_trot_step(&mut s.model, step)?;
            }
            return Ok(());
        }
        if let Some(step) = s.forwarder.exit() {
            self.run_trot_step(&mut s.model, step)?;
        }

        let g = self.primitives.config();
        let p = &self.primitives;
        match command {
            Command::ForwardOneLegged => {
                p.walk_one_legged(&mut s.model, 0.0, g.single_step, &FORWARD_ORDER)?
            }
            Command::BackwardOneLegged => {
                p.walk_one_legged(&mut s.model, 0.0, -g.single_step, &BACKWARD_ORDER)?
            }
            Command::StrafeLeftOneLegged => {
                p.walk_one_legged(&mut s.model, -g.single_step, 0.0, &STRAFE_LEFT_ORDER)?
            }
            Command::StrafeRightOneLegged => {
                p.walk_one_legged(&mut s.model, g.single_step, 0.0, &STRAFE_RIGHT_ORDER)?
            }
            Command::BodyForward => self.shift_body(s, 0.0, g.body_shift)?,
            Command::BodyBackward => self.shift_body(s, 0.0, -g.body_shift)?,
            Command::BodyLeft => self.shift_body(s, -g.body_shift, 0.0)?,
            Command::BodyRight => self.shift_body(s, g.body_shift, 0.0)?,
            Command::BodyToCenter => {
                s.model.recenter_body()?;
                s.envelope.reset_body();
            }
            Command::Up => s.model.move_body(0.0, 0.0, g.up_down_step)?,
            Command::Down => s.model.move_body(0.0, 0.0, -g.up_down_step)?,
            Command::TurnLeft => p.turn_move(&mut s.model, -g.turn_angle)?,
            Command::TurnRight => p.turn_move(&mut s.model, g.turn_angle)?,
            Command::TurnLeftOneLegged => p.turn_one_legged(&mut s.model, -g.turn_angle)?,
            Command::TurnRightOneLegged => p.turn_one_legged(&mut s.model, g.turn_angle)?,
            Command::ClimbUp => p.climb_two_legged(&mut s.model, g.climb_height)?,
            Command::ClimbDown => p.climb_two_legged(&mut s.model, -g.climb_height)?,
            Command::LookLeft => self.look_side(s, -g.side_look_step)?,
            Command::LookRight => self.look_side(s, g.side_look_step)?,
            Command::LookUp => self.look_vertical(s, g.vertical_look_step)?,
            Command::LookDown => self.look_vertical(s, -g.vertical_look_step)?,
            Command::SightToNormal => self.sight_to_normal(s)?,
            Command::RepositionXUp => p.reposition(&mut s.model, g.reposition_step, 0.0)?,
            Command::RepositionXDown => p.reposition(&mut s.model, -g.reposition_step, 0.0)?,
            Command::RepositionYUp => p.reposition(&mut s.model, 0.0, g.reposition_step)?,
            Command::RepositionYDown => p.reposition(&mut s.model, 0.0, -g.reposition_step)?,
            Command::Reset => {
                self.sight_to_normal(s)?;
                p.reset_stance(&mut s.model)?;
                s.envelope.reset_body();
            }
            Command::None => {}
            Command::ForwardTwoLegged
            | Command::BackwardTwoLegged
            | Command::StrafeLeftTwoLegged
            | Command::StrafeRightTwoLegged
            | Command::RunForward
            | Command::RunBackward
            | Command::RunStrafeLeft
            | Command::RunStrafeRight => {}
        }
        Ok(())
    }

    fn shift_body(&self, s: &mut Scratch, dx: f64, dy: f64) -> Result<()> {
        s.envelope.check_body_shift(dx, dy)?;
        s.model.move_body(dx, dy, 0.0)?;
        s.envelope.apply_body_shift(dx, dy);
        Ok(())
    }

    fn look_side(&self, s: &mut Scratch, delta: f64) -> Result<()> {
        s.envelope.check_side_look(delta)?;
        self.primitives.turn_body(&mut s.model, delta)?;
        s.envelope.apply_side_look(delta);
        Ok(())
    }

    fn look_vertical(&self, s: &mut Scratch, delta: f64) -> Result<()> {
        let current = s.envelope.vertical_look();
        let target = current + delta;
        s.envelope.check_vertical_look(target)?;
        self.primitives.look_vertical(&mut s.model, current, target)?;
        s.envelope.set_vertical_look(target);
        Ok(())
    }

    fn sight_to_normal(&self, s: &mut Scratch) -> Result<()> {
        let vertical = s.envelope.vertical_look();
        if vertical != 0.0 {
            self.primitives.look_vertical(&mut s.model, vertical, 0.0)?;
        }
        let side = s.envelope.side_look();
        if side != 0.0 {
            self.primitives.turn_body(&mut s.model, -side)?;
        }
        s.envelope.reset_look();
        Ok(())
    }
}
